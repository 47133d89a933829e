use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::input::ClickButton;

/// Largest row or column count a grid may have.
pub const MAX_GRID_SIDE: u32 = 1_000;
/// Largest per-click random offset, in pixels.
pub const MAX_RANDOM_OFFSET_PX: u32 = 10_000;

/// Screen position in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn minus(self, other: Point) -> Point {
        Point::new(self.x.saturating_sub(other.x), self.y.saturating_sub(other.y))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub origin_x: i32,
    pub origin_y: i32,
    pub step_x: i32,
    pub step_y: i32,
    pub rows: u32,
    pub cols: u32,
    /// Constant correction added to every position.
    pub offset_dx: i32,
    pub offset_dy: i32,
    /// Per-click random offset bound, drawn independently on each axis.
    pub random_offset_px: u32,
    pub clicks_per_position: u32,
    pub button: ClickButton,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            origin_x: 854,
            origin_y: 400,
            step_x: 84,
            step_y: 84,
            rows: 5,
            cols: 4,
            offset_dx: 0,
            offset_dy: 0,
            random_offset_px: 20,
            clicks_per_position: 2,
            button: ClickButton::Left,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_GRID_SIDE).contains(&self.rows) {
            return Err(ConfigError::Rows(self.rows));
        }
        if !(1..=MAX_GRID_SIDE).contains(&self.cols) {
            return Err(ConfigError::Columns(self.cols));
        }
        // A zero step only matters when there is more than one position on that axis.
        if self.cols > 1 && self.step_x == 0 {
            return Err(ConfigError::ZeroStep("x"));
        }
        if self.rows > 1 && self.step_y == 0 {
            return Err(ConfigError::ZeroStep("y"));
        }
        if self.clicks_per_position < 1 {
            return Err(ConfigError::ClicksPerPosition);
        }
        if self.random_offset_px > MAX_RANDOM_OFFSET_PX {
            return Err(ConfigError::RandomOffset(self.random_offset_px));
        }
        // Every jittered position of both corner cells must be a valid i32.
        let jitter = i64::from(self.random_offset_px);
        for (row, col) in [(0, 0), (self.rows - 1, self.cols - 1)] {
            let (x, y) = self.raw_center(row, col);
            for v in [x - jitter, x + jitter, y - jitter, y + jitter] {
                if i32::try_from(v).is_err() {
                    return Err(ConfigError::GridOverflow);
                }
            }
        }
        Ok(())
    }

    fn raw_center(&self, row: u32, col: u32) -> (i64, i64) {
        let axis = |origin: i32, index: u32, step: i32, offset: i32| {
            i64::from(origin)
                .saturating_add(i64::from(index).saturating_mul(i64::from(step)))
                .saturating_add(i64::from(offset))
        };
        (
            axis(self.origin_x, col, self.step_x, self.offset_dx),
            axis(self.origin_y, row, self.step_y, self.offset_dy),
        )
    }

    pub fn position_count(&self) -> u64 {
        u64::from(self.rows) * u64::from(self.cols)
    }

    /// Corners of the area covered by position centers, offsets included.
    pub fn extent(&self) -> (Point, Point) {
        let model = GridModel::new(self.clone());
        let a = model.center_for(0, 0);
        let b = model.center_for(self.rows.max(1) - 1, self.cols.max(1) - 1);
        (
            Point::new(a.x.min(b.x), a.y.min(b.y)),
            Point::new(a.x.max(b.x), a.y.max(b.y)),
        )
    }
}

fn saturate(v: i64) -> i32 {
    i32::try_from(v).unwrap_or(if v < 0 { i32::MIN } else { i32::MAX })
}

/// Maps (row, column) cells to absolute screen coordinates.
#[derive(Clone, Debug)]
pub struct GridModel {
    config: GridConfig,
}

impl GridModel {
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Deterministic center of a cell, calibration offset applied.
    ///
    /// Panics when `row`/`col` are outside the configured grid.
    pub fn center_for(&self, row: u32, col: u32) -> Point {
        let c = &self.config;
        assert!(row < c.rows, "row {row} out of range (rows = {})", c.rows);
        assert!(col < c.cols, "col {col} out of range (cols = {})", c.cols);

        let (x, y) = c.raw_center(row, col);
        Point::new(saturate(x), saturate(y))
    }

    /// Center of a cell perturbed by a fresh uniform draw in
    /// `[-random_offset_px, +random_offset_px]` on each axis.
    pub fn position_for<R: Rng + ?Sized>(&self, row: u32, col: u32, rng: &mut R) -> Point {
        let center = self.center_for(row, col);
        let bound = i32::try_from(self.config.random_offset_px).unwrap_or(i32::MAX);
        if bound == 0 {
            return center;
        }
        let p = Point::new(
            center.x.saturating_add(rng.gen_range(-bound..=bound)),
            center.y.saturating_add(rng.gen_range(-bound..=bound)),
        );
        debug!("cell ({row},{col}) center {center:?} -> {p:?}");
        p
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> {
        let cols = self.config.cols;
        (0..self.config.rows).flat_map(move |r| (0..cols).map(move |c| (r, c)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationPoint {
    /// Cell (0,0).
    Origin,
    /// Cell (0,1).
    NextColumn,
    /// Cell (1,0).
    NextRow,
}

impl CalibrationPoint {
    pub const ALL: [CalibrationPoint; 3] = [
        CalibrationPoint::Origin,
        CalibrationPoint::NextColumn,
        CalibrationPoint::NextRow,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CalibrationPoint::Origin => "(0,0)",
            CalibrationPoint::NextColumn => "(0,1)",
            CalibrationPoint::NextRow => "(1,0)",
        }
    }
}

/// Result of solving the three-point calibration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSolve {
    pub origin: Point,
    pub column_step: Option<Point>,
    pub row_step: Option<Point>,
}

/// Captured calibration points. One point is armed at a time and the next
/// capture fills it in.
#[derive(Clone, Debug, Default)]
pub struct Calibration {
    origin: Option<Point>,
    next_column: Option<Point>,
    next_row: Option<Point>,
    armed: Option<CalibrationPoint>,
}

impl Calibration {
    pub fn arm(&mut self, point: CalibrationPoint) {
        self.armed = Some(point);
    }

    pub fn armed(&self) -> Option<CalibrationPoint> {
        self.armed
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn get(&self, point: CalibrationPoint) -> Option<Point> {
        match point {
            CalibrationPoint::Origin => self.origin,
            CalibrationPoint::NextColumn => self.next_column,
            CalibrationPoint::NextRow => self.next_row,
        }
    }

    pub fn record(&mut self, point: CalibrationPoint, at: Point) {
        match point {
            CalibrationPoint::Origin => self.origin = Some(at),
            CalibrationPoint::NextColumn => self.next_column = Some(at),
            CalibrationPoint::NextRow => self.next_row = Some(at),
        }
    }

    /// Fills the armed point with `at` and disarms. Returns `None` when
    /// nothing was armed.
    pub fn capture(&mut self, at: Point) -> Option<CalibrationPoint> {
        let point = self.armed.take()?;
        self.record(point, at);
        Some(point)
    }

    /// Direct linear solve from whatever has been captured so far. Needs at
    /// least the origin.
    pub fn solve(&self) -> Option<GridSolve> {
        let origin = self.origin?;
        Some(GridSolve {
            origin,
            column_step: self.next_column.map(|p| p.minus(origin)),
            row_step: self.next_row.map(|p| p.minus(origin)),
        })
    }

    /// Writes the solved origin/steps into `grid`. Returns false when there
    /// is nothing to apply yet.
    pub fn apply(&self, grid: &mut GridConfig) -> bool {
        let Some(solve) = self.solve() else {
            return false;
        };
        grid.origin_x = solve.origin.x;
        grid.origin_y = solve.origin.y;
        if let Some(step) = solve.column_step {
            grid.step_x = step.x;
        }
        if let Some(step) = solve.row_step {
            grid.step_y = step.y;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grid(random_offset_px: u32) -> GridConfig {
        GridConfig {
            origin_x: 100,
            origin_y: 200,
            step_x: 50,
            step_y: 40,
            rows: 3,
            cols: 4,
            offset_dx: 0,
            offset_dy: 0,
            random_offset_px,
            clicks_per_position: 1,
            button: ClickButton::Left,
        }
    }

    #[test]
    fn test_position_is_deterministic_without_jitter() {
        let model = GridModel::new(grid(0));
        let mut rng = StdRng::seed_from_u64(7);
        for (r, c) in model.cells() {
            let p = model.position_for(r, c, &mut rng);
            assert_eq!(p, Point::new(100 + c as i32 * 50, 200 + r as i32 * 40));
            assert_eq!(p, model.position_for(r, c, &mut rng));
        }
    }

    #[test]
    fn test_position_stays_within_jitter_bound() {
        let model = GridModel::new(grid(5));
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let p = model.position_for(2, 3, &mut rng);
            assert!((p.x - 250).abs() <= 5);
            assert!((p.y - 280).abs() <= 5);
        }
    }

    #[test]
    fn test_calibration_offset_applied() {
        let mut cfg = grid(0);
        cfg.offset_dx = 3;
        cfg.offset_dy = -2;
        let model = GridModel::new(cfg);
        assert_eq!(model.center_for(1, 1), Point::new(153, 238));
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_cell_panics() {
        GridModel::new(grid(0)).center_for(3, 0);
    }

    #[test]
    fn test_cells_are_row_major() {
        let mut cfg = grid(0);
        cfg.rows = 2;
        cfg.cols = 2;
        let cells: Vec<_> = GridModel::new(cfg).cells().collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_validation() {
        assert!(GridConfig::default().validate().is_ok());

        let mut cfg = grid(0);
        cfg.rows = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::Rows(0)));

        let mut cfg = grid(0);
        cfg.step_x = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroStep("x")));

        // single column: zero horizontal step is harmless
        cfg.cols = 1;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_out_of_range_grids() {
        let mut cfg = grid(0);
        cfg.random_offset_px = u32::MAX;
        assert_eq!(cfg.validate(), Err(ConfigError::RandomOffset(u32::MAX)));

        let mut cfg = grid(0);
        cfg.cols = MAX_GRID_SIDE + 1;
        assert_eq!(cfg.validate(), Err(ConfigError::Columns(MAX_GRID_SIDE + 1)));

        let mut cfg = grid(0);
        cfg.step_x = i32::MAX;
        assert_eq!(cfg.validate(), Err(ConfigError::GridOverflow));

        let mut cfg = grid(5);
        cfg.origin_y = i32::MIN + 2;
        assert_eq!(cfg.validate(), Err(ConfigError::GridOverflow));
    }

    #[test]
    fn test_unvalidated_extremes_saturate() {
        let model = GridModel::new(GridConfig {
            origin_x: i32::MAX - 1,
            step_x: i32::MAX,
            rows: 1,
            cols: 3,
            random_offset_px: u32::MAX,
            ..GridConfig::default()
        });
        assert_eq!(model.center_for(0, 2).x, i32::MAX);
        let mut rng = StdRng::seed_from_u64(5);
        // Full-range offsets on a saturated center must not overflow.
        for _ in 0..50 {
            model.position_for(0, 1, &mut rng);
        }
    }

    #[test]
    fn test_three_point_calibration() {
        let mut cal = Calibration::default();
        cal.record(CalibrationPoint::Origin, Point::new(100, 100));
        cal.record(CalibrationPoint::NextColumn, Point::new(150, 100));
        cal.record(CalibrationPoint::NextRow, Point::new(100, 140));

        let solve = cal.solve().unwrap();
        assert_eq!(solve.origin, Point::new(100, 100));
        assert_eq!(solve.column_step, Some(Point::new(50, 0)));
        assert_eq!(solve.row_step, Some(Point::new(0, 40)));

        let mut cfg = GridConfig::default();
        assert!(cal.apply(&mut cfg));
        assert_eq!((cfg.origin_x, cfg.origin_y), (100, 100));
        assert_eq!((cfg.step_x, cfg.step_y), (50, 40));
    }

    #[test]
    fn test_partial_calibration_only_moves_origin() {
        let mut cal = Calibration::default();
        let mut cfg = GridConfig::default();
        assert!(!cal.apply(&mut cfg));

        cal.arm(CalibrationPoint::Origin);
        assert_eq!(cal.capture(Point::new(10, 20)), Some(CalibrationPoint::Origin));
        assert_eq!(cal.armed(), None);
        assert!(cal.apply(&mut cfg));
        assert_eq!((cfg.origin_x, cfg.origin_y), (10, 20));
        assert_eq!((cfg.step_x, cfg.step_y), (84, 84));
    }

    #[test]
    fn test_capture_without_armed_point_is_ignored() {
        let mut cal = Calibration::default();
        assert_eq!(cal.capture(Point::new(1, 1)), None);
        assert!(cal.solve().is_none());
    }
}
