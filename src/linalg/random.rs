/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::Matrix;
use ::rand::Rng;
use ::rand::distributions::normal::StandardNormal;

/// Overwrite every entry with an independent `N(0, 1)` variate.
pub fn initialize_random_matrix(m: &mut Matrix)
{ fill_gaussian(m, &mut ::rand::thread_rng()) }

/// [`initialize_random_matrix`] with a caller-supplied generator.
pub fn fill_gaussian<R: Rng>(m: &mut Matrix, rng: &mut R)
{
    for x in m.column_major_data_mut() {
        *x = rng.gen::<StandardNormal>().0;
    }
}
