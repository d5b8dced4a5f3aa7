#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure column scan that locates the ground entities can stand on.
//!
//! The probe walks a column from the top down. A solid run touching the top
//! of the scan is treated as a roof and skipped; the first solid block below
//! an empty cell is reported as the surface. Results are never cached since
//! the world may change between waves.

use thiserror::Error;
use wave_spawner_core::{ColumnCoord, SurfaceHeight, WorldAccess};

/// Raised when a column holds no floor below open space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("no surface found in column {column}")]
pub struct NoSurfaceFound {
    column: ColumnCoord,
}

impl NoSurfaceFound {
    /// Column that was scanned.
    #[must_use]
    pub const fn column(&self) -> ColumnCoord {
        self.column
    }
}

/// Scans `column` from `top_y` down to `bottom_y + 1` and reports the surface.
///
/// Fully solid and fully empty ranges both yield [`NoSurfaceFound`].
pub fn find_surface<W>(
    world: &W,
    column: ColumnCoord,
    top_y: i32,
    bottom_y: i32,
) -> Result<SurfaceHeight, NoSurfaceFound>
where
    W: WorldAccess + ?Sized,
{
    let mut inside_ceiling = false;

    for y in (bottom_y.saturating_add(1)..=top_y).rev() {
        if world.is_solid_at(column.at(y)) {
            if y == top_y {
                inside_ceiling = true;
            } else if !inside_ceiling {
                return Ok(SurfaceHeight::new(y));
            }
        } else {
            inside_ceiling = false;
        }
    }

    Err(NoSurfaceFound { column })
}

/// Scans the full height of `column`, leaving the bottom layer out of the search.
pub fn find_ground_level<W>(world: &W, column: ColumnCoord) -> Result<SurfaceHeight, NoSurfaceFound>
where
    W: WorldAccess + ?Sized,
{
    find_surface(world, column, world.world_height() - 1, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wave_spawner_core::BlockPos;

    struct Stack(Vec<bool>);

    impl WorldAccess for Stack {
        fn is_solid_at(&self, pos: BlockPos) -> bool {
            usize::try_from(pos.y())
                .ok()
                .and_then(|y| self.0.get(y).copied())
                .unwrap_or(false)
        }

        fn world_height(&self) -> i32 {
            self.0.len() as i32
        }
    }

    #[test]
    fn empty_range_has_no_surface() {
        let world = Stack(vec![true; 4]);
        assert!(find_surface(&world, ColumnCoord::new(0, 0), 2, 2).is_err());
        assert!(find_surface(&world, ColumnCoord::new(0, 0), 1, 3).is_err());
    }

    #[test]
    fn bottom_layer_is_never_reported() {
        let world = Stack(vec![true, false, false, false]);
        assert!(find_ground_level(&world, ColumnCoord::new(0, 0)).is_err());
    }
}
