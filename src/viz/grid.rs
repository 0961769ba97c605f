use plotters::coord::Shift;
use plotters::prelude::*;

use crate::data::sample::RawSample;
use crate::error::Error;

/// The panel contract for [`grid_plot`]: draws one chart for one
/// iteration key onto the panel's drawing area.
///
/// The tuple of (canvas, data, key) is fixed by the function type, so a
/// mismatched panel fails to compile rather than at runtime.
pub type PanelFn<DB, K> = fn(&DrawingArea<DB, Shift>, &RawSample, &K) -> Result<(), Error>;

/// Plots a grid of panels, one per iteration key.
///
/// The drawing area is split into `ceil(n / cols)` rows by `cols`
/// columns and `panel` is invoked once per key on its own sub-area.
///
/// # Arguments
///
/// * `area` - The drawing area covering the whole grid.
/// * `data` - The sample table shared by all panels.
/// * `panel` - The panel function; [`PanelFn`] fixes its contract.
/// * `iter_items` - The keys distinguishing the panels, e.g. timestamps.
/// * `cols` - The number of grid columns.
///
/// # Errors
///
/// * `Error::InvalidGridLayout` if `cols` is zero.
/// * Any error returned by a panel invocation.
pub fn grid_plot<DB: DrawingBackend, K>(
    area: &DrawingArea<DB, Shift>,
    data: &RawSample,
    panel: PanelFn<DB, K>,
    iter_items: &[K],
    cols: usize,
) -> Result<(), Error> {
    if cols == 0 {
        return Err(Error::InvalidGridLayout("cols must be positive".to_string()));
    }
    if iter_items.is_empty() {
        return Ok(());
    }

    let rows = iter_items.len().div_ceil(cols);
    let panels = area.split_evenly((rows, cols));

    for (item, sub_area) in iter_items.iter().zip(panels.iter()) {
        panel(sub_area, data, item)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_panel<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        _data: &RawSample,
        _item: &f64,
    ) -> Result<(), Error> {
        area.fill(&WHITE).map_err(|e| Error::Plot(e.to_string()))
    }

    #[test]
    fn test_grid_plot_draws_all_panels() {
        let mut buffer = vec![0u8; 400 * 300 * 3];
        let sample = RawSample::new(vec![1.0], vec![28.0], vec![10.0]);

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (400, 300)).into_drawing_area();
            // Five items over four columns: two rows
            grid_plot(&root, &sample, blank_panel, &[1.0, 2.0, 3.0, 4.0, 5.0], 4).unwrap();
            root.present().unwrap();
        }

        assert!(buffer.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_grid_plot_zero_cols() {
        let mut buffer = vec![0u8; 100 * 100 * 3];
        let root = BitMapBackend::with_buffer(&mut buffer, (100, 100)).into_drawing_area();
        let sample = RawSample::new(vec![], vec![], vec![]);

        let result = grid_plot(&root, &sample, blank_panel, &[1.0], 0);

        assert!(matches!(result, Err(Error::InvalidGridLayout(_))));
    }

    #[test]
    fn test_grid_plot_no_items() {
        let mut buffer = vec![0u8; 100 * 100 * 3];
        let root = BitMapBackend::with_buffer(&mut buffer, (100, 100)).into_drawing_area();
        let sample = RawSample::new(vec![], vec![], vec![]);

        assert!(grid_plot(&root, &sample, blank_panel, &[], 4).is_ok());
    }
}
