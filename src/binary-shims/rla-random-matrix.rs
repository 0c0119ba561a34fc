fn main() { ::rla_tasks::entry_points::random_matrix() }
