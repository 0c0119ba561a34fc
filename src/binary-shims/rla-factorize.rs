fn main() { ::rla_tasks::entry_points::factorize() }
