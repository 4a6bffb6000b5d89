use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};
use plotters::{coord::Shift, prelude::*};
use thiserror::Error;

use crate::{
    fit::{Fit, Trajectory},
    model::{Float, LinearModel, Sample},
};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("cannot plot an empty sample set")]
    EmptySamples,

    #[error("cannot plot an empty trajectory")]
    EmptyTrajectory,

    #[error("could not prepare the output directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("drawing failed: {0}")]
    Drawing(String),
}

fn drawing<E: std::fmt::Display>(err: E) -> ReportError {
    ReportError::Drawing(err.to_string())
}

/// Files written by [`Reporter::render`] and the boundary they show.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub boundary_plot: PathBuf,
    pub parameters_plot: PathBuf,
    pub boundary: Option<Float>,
}

/// Renders a trained model to PNG files in `output_dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reporter {
    output_dir: PathBuf,
    width: u32,
    height: u32,
}

impl Reporter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            width: 1024,
            height: 768,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn render(&self, samples: &[Sample], fit: &Fit) -> Result<ReportSummary, ReportError> {
        fs::create_dir_all(&self.output_dir)?;
        let size = (self.width, self.height);

        let boundary_plot = self.output_dir.join("boundary.png");
        let boundary = plot_decision_boundary(&boundary_plot, size, samples, fit.model())?;

        let parameters_plot = self.output_dir.join("parameters.png");
        plot_parameter_history(&parameters_plot, size, fit.trajectory(), fit.mistakes())?;

        info!(
            "wrote {} and {}",
            boundary_plot.display(),
            parameters_plot.display()
        );
        Ok(ReportSummary {
            boundary_plot,
            parameters_plot,
            boundary,
        })
    }
}

/// The boundary point of `model`, or `None` (with a warning) for a flat model.
pub fn boundary_point(model: &LinearModel) -> Option<Float> {
    match model.boundary() {
        Ok(x) => Some(x),
        Err(err) => {
            warn!("{} ({})", err, model);
            None
        }
    }
}

fn class_color(label: i8) -> RGBColor {
    if label > 0 {
        MAGENTA
    } else {
        CYAN
    }
}

fn feature_bounds(samples: &[Sample]) -> (Float, Float) {
    samples
        .iter()
        .fold((Float::INFINITY, Float::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.feature), hi.max(s.feature))
        })
}

/// Largest magnitude put on a chart axis. Coordinates past it are pinned to
/// the edge so axis spans stay finite.
const AXIS_LIMIT: Float = 1e12;

fn on_axis(v: Float) -> Float {
    v.clamp(-AXIS_LIMIT, AXIS_LIMIT)
}

fn padded_range(values: impl Iterator<Item = Float>) -> (Float, Float) {
    let (lo, hi) = values
        .filter(|v| !v.is_nan())
        .map(on_axis)
        .fold((Float::INFINITY, Float::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return (0.0, 1.0);
    }
    let pad = if hi - lo > Float::EPSILON {
        (hi - lo) * 0.05
    } else {
        1.0
    };
    (lo - pad, hi + pad)
}

/// Draws the samples on the x axis, the score line `z(x)` and, when the
/// model has one, the boundary point with the step between the two classes.
///
/// Returns the boundary point that was drawn.
pub fn plot_decision_boundary(
    path: &Path,
    size: (u32, u32),
    samples: &[Sample],
    model: &LinearModel,
) -> Result<Option<Float>, ReportError> {
    if samples.is_empty() {
        return Err(ReportError::EmptySamples);
    }

    let (x_min, x_max) = feature_bounds(samples);
    let (x_min, x_max) = (on_axis(x_min), on_axis(x_max));
    let (x_lo, x_hi) = (x_min - 1.0, x_max + 1.0);
    let z_ends = [model.score(x_min), model.score(x_max)].map(on_axis);
    if z_ends.iter().any(|z| z.is_nan()) {
        return Err(ReportError::Drawing(format!(
            "score of {} is undefined over [{}, {}]",
            model, x_min, x_max
        )));
    }
    let y_lo = z_ends.iter().copied().fold(-2.0, Float::min);
    let y_hi = z_ends.iter().copied().fold(2.0, Float::max);

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(drawing)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{}", model), ("sans-serif", 30))
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 40)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(drawing)?;

    chart
        .configure_mesh()
        .x_desc("Data")
        .draw()
        .map_err(drawing)?;

    // Axes
    chart
        .draw_series(LineSeries::new(vec![(x_lo, 0.0), (x_hi, 0.0)], &BLACK))
        .map_err(drawing)?;
    if x_lo <= 0.0 && 0.0 <= x_hi {
        chart
            .draw_series(LineSeries::new(vec![(0.0, y_lo), (0.0, y_hi)], &BLACK))
            .map_err(drawing)?;
    }

    chart
        .draw_series(LineSeries::new(
            vec![(x_min, z_ends[0]), (x_max, z_ends[1])],
            &RED,
        ))
        .map_err(drawing)?;

    let boundary = boundary_point(model);
    if let Some(x) = boundary {
        let cut = x.clamp(x_min, x_max);
        let left = Float::from(model.predict(x_min));
        let right = Float::from(model.predict(x_max));
        chart
            .draw_series(LineSeries::new(
                vec![(x_min, left), (cut, left), (cut, right), (x_max, right)],
                &BLUE,
            ))
            .map_err(drawing)?;

        if x_lo <= x && x <= x_hi {
            chart
                .draw_series(std::iter::once(Cross::new(
                    (x, 0.0),
                    8,
                    BLACK.stroke_width(3),
                )))
                .map_err(drawing)?;
            chart
                .draw_series(std::iter::once(Text::new(
                    "Decision Boundary",
                    (x, 1.1),
                    ("sans-serif", 15).into_font().color(&BLUE),
                )))
                .map_err(drawing)?;
        }
    }

    chart
        .draw_series(
            samples.iter().map(|s| {
                Circle::new((on_axis(s.feature), 0.0), 5, class_color(s.label).filled())
            }),
        )
        .map_err(drawing)?;
    chart
        .draw_series(
            samples
                .iter()
                .map(|s| Circle::new((on_axis(s.feature), 0.0), 5, &BLACK)),
        )
        .map_err(drawing)?;

    root.present().map_err(drawing)?;
    Ok(boundary)
}

fn draw_history_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    caption: &str,
    points: &[(Float, Float)],
    color: &RGBColor,
) -> Result<(), ReportError> {
    let x_hi = points.iter().map(|p| p.0).fold(1.0, Float::max);
    let x_lo = points.iter().map(|p| p.0).fold(0.0, Float::min);
    let (y_lo, y_hi) = padded_range(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 30)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(drawing)?;

    chart
        .configure_mesh()
        .x_desc("epoch")
        .draw()
        .map_err(drawing)?;

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|&(x, y)| (x, on_axis(y))),
            color,
        ))
        .map_err(drawing)?;
    Ok(())
}

/// Draws `m`, `b` and the per-epoch mistake count against the epoch index,
/// one panel each.
pub fn plot_parameter_history(
    path: &Path,
    size: (u32, u32),
    trajectory: &Trajectory,
    mistakes: &[usize],
) -> Result<(), ReportError> {
    if trajectory.is_empty() {
        return Err(ReportError::EmptyTrajectory);
    }

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(drawing)?;
    let panels = root.split_evenly((3, 1));

    let slopes: Vec<(Float, Float)> = trajectory
        .slopes()
        .enumerate()
        .map(|(epoch, m)| (epoch as Float, m))
        .collect();
    let intercepts: Vec<(Float, Float)> = trajectory
        .intercepts()
        .enumerate()
        .map(|(epoch, b)| (epoch as Float, b))
        .collect();
    // Mistakes of epoch i lead to snapshot i + 1.
    let mistakes: Vec<(Float, Float)> = mistakes
        .iter()
        .enumerate()
        .map(|(epoch, &n)| ((epoch + 1) as Float, n as Float))
        .collect();

    draw_history_panel(&panels[0], "m", &slopes, &BLUE)?;
    draw_history_panel(&panels[1], "b", &intercepts, &RED)?;
    draw_history_panel(&panels[2], "mistakes", &mistakes, &GREEN)?;

    root.present().map_err(drawing)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::train_from;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "perceptron-report-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn samples() -> Vec<Sample> {
        vec![
            Sample::new(-5.0, -1),
            Sample::new(-3.0, -1),
            Sample::new(2.0, 1),
            Sample::new(4.0, 1),
        ]
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(std::iter::empty()), (0.0, 1.0));
        assert_eq!(padded_range([2.0, 2.0].into_iter()), (1.0, 3.0));
        let (lo, hi) = padded_range([0.0, 10.0].into_iter());
        assert!((lo + 0.5).abs() < 1e-12 && (hi - 10.5).abs() < 1e-12);
    }

    #[test]
    fn test_padded_range_stays_finite() {
        let (lo, hi) = padded_range([-Float::MAX, Float::MAX, Float::NAN].into_iter());
        assert!(lo.is_finite() && hi.is_finite() && (hi - lo).is_finite());
        assert!(lo <= -AXIS_LIMIT && hi >= AXIS_LIMIT);
        assert_eq!(padded_range([Float::NAN].into_iter()), (0.0, 1.0));
    }

    #[test]
    fn test_boundary_point() {
        assert_eq!(boundary_point(&LinearModel::new(2.0, 1.0)), Some(-0.5));
        assert_eq!(boundary_point(&LinearModel::new(0.0, 1.0)), None);
    }

    #[test]
    fn test_render_writes_both_plots() {
        let data = samples();
        let fit = train_from(&data, -1.0, 0.5, 0.1, 20).unwrap();
        let dir = scratch_dir("render");

        let summary = Reporter::new(&dir)
            .with_size(320, 240)
            .render(&data, &fit)
            .unwrap();

        assert!(summary.boundary_plot.exists());
        assert!(summary.parameters_plot.exists());
        let x = summary.boundary.unwrap();
        assert!((x - fit.model().boundary().unwrap()).abs() < 1e-12);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_flat_model_renders_without_boundary() {
        let data = samples();
        let fit = train_from(&data, 0.0, 1.0, 0.1, 0).unwrap();
        let dir = scratch_dir("flat");

        let summary = Reporter::new(&dir)
            .with_size(320, 240)
            .render(&data, &fit)
            .unwrap();

        assert_eq!(summary.boundary, None);
        assert!(summary.boundary_plot.exists());
        assert!(summary.parameters_plot.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_overflowing_scores_are_pinned_to_the_axis() {
        let dir = scratch_dir("overflow");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("boundary.png");

        // Both ends of the score line overflow to infinity.
        let model = LinearModel::new(1e308, 1e308);
        assert!(model.score(4.0).is_infinite());
        let boundary = plot_decision_boundary(&path, (320, 240), &samples(), &model).unwrap();

        assert_eq!(boundary, Some(-1.0));
        assert!(path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_undefined_score_is_a_drawing_error() {
        let dir = scratch_dir("undefined");
        fs::create_dir_all(&dir).unwrap();

        // inf - inf at x = 4.
        let model = LinearModel::new(Float::MAX, Float::NEG_INFINITY);
        let path = dir.join("boundary.png");
        let err = plot_decision_boundary(&path, (320, 240), &samples(), &model).unwrap_err();

        assert!(matches!(err, ReportError::Drawing(_)));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        let dir = scratch_dir("empty");
        fs::create_dir_all(&dir).unwrap();
        let err = plot_decision_boundary(
            &dir.join("boundary.png"),
            (100, 100),
            &[],
            &LinearModel::new(1.0, 0.0),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::EmptySamples));

        let err = plot_parameter_history(
            &dir.join("parameters.png"),
            (100, 100),
            &Trajectory::default(),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::EmptyTrajectory));
        let _ = fs::remove_dir_all(&dir);
    }
}
