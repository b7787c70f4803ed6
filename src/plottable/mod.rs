#![warn(missing_docs)]
//! Rendering of a beam profile together with its lenses and probes.
//!
//! The geometry of everything that is drawn (axis limits, lens ellipses, probe lines and label
//! anchors) is computed by [`BeamPlot`] from pre-sampled data. The actual drawing is done with
//! `plotters` on one of the backends listed in [`PltBackEnd`].
pub mod ax_lims;
pub use ax_lims::AxLims;

use crate::{
    error::{BeamPropError, BpResult},
    optical_element::Lens,
    propagation::{BeamPropagation, BeamProfile, ProbeReading},
};
use image::RgbImage;
use itertools::izip;
use log::{info, warn};
use plotters::{
    backend::{DrawingBackend, PixelFormat, RGBPixel},
    chart::{ChartBuilder, ChartContext},
    coord::{cartesian::Cartesian2d, types::RangedCoordf64, Shift},
    element::{PathElement, Polygon, Text},
    prelude::{BitMapBackend, DrawingArea, IntoDrawingArea, SVGBackend},
    series::LineSeries,
    style::{
        text_anchor::{HPos, Pos, VPos},
        Color, IntoFont, RGBColor, TextStyle, WHITE,
    },
};
use serde::{Deserialize, Serialize};
use std::{f64::consts::PI, path::Path};
use uom::si::{f64::Length, length::meter};

type BeamChart<'a, B> = ChartContext<'a, B, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Number of points used for the outline of a lens ellipse.
const LENS_OUTLINE_POINTS: usize = 64;

///Enum to describe which type of plotting backend should be used
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PltBackEnd {
    /// `BitmapBackend`. Used to create .png, .bmp, .jpg
    #[default]
    Bitmap,
    /// `SVGBackend`. Used to create .svg
    SVG,
    /// Buffered Backend. Used to buffer the image data into an image buffer.
    Buf,
}
impl PltBackEnd {
    /// Select the file backend matching the extension of the given path.
    ///
    /// `.svg` selects [`PltBackEnd::SVG`], everything else [`PltBackEnd::Bitmap`].
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => Self::SVG,
            _ => Self::Bitmap,
        }
    }
}

/// Options controlling the sampling and the appearance of a beam plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotOptions {
    /// figure size in pixels (width, height)
    pub fig_size: (u32, u32),
    /// start of the sampled range along the optical axis
    pub x_min: Length,
    /// end of the sampled range along the optical axis
    pub x_max: Length,
    /// number of sample points
    pub samples: usize,
    /// symmetric limit of the y axis in mm. Derived from the data if not set.
    pub y_limit: Option<f64>,
    /// overlay the unclipped curve of each beam segment
    pub show_segments: bool,
    /// plotting backend
    #[serde(skip)]
    pub backend: PltBackEnd,
}
impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            fig_size: (2000, 300),
            x_min: Length::new::<meter>(-0.1),
            x_max: Length::new::<meter>(0.5),
            samples: 1000,
            y_limit: None,
            show_segments: false,
            backend: PltBackEnd::default(),
        }
    }
}

/// Geometry of a lens drawn as an ellipse centered on the optical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensMarker {
    /// axial position of the lens in m
    pub position: f64,
    /// full width of the ellipse in m
    pub width: f64,
    /// full height of the ellipse in mm
    pub height: f64,
}
impl LensMarker {
    /// Returns `nr_of_points` points on the outline of the ellipse.
    #[must_use]
    pub fn outline(&self, nr_of_points: usize) -> Vec<(f64, f64)> {
        #[allow(clippy::cast_precision_loss)]
        let step = 2.0 * PI / nr_of_points as f64;
        (0..nr_of_points)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let phi = step * i as f64;
                (
                    self.width.mul_add(0.5 * phi.cos(), self.position),
                    0.5 * self.height * phi.sin(),
                )
            })
            .collect()
    }
}

/// Geometry of a probe drawn as a vertical line with a label.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeMarker {
    /// axial position of the probe in m
    pub position: f64,
    /// lower and upper end of the vertical line
    pub line: [(f64, f64); 2],
    /// text of the label
    pub label: String,
    /// lower left corner of the label
    pub label_anchor: (f64, f64),
}

/// A plot of a sampled beam profile.
#[derive(Debug, Clone)]
pub struct BeamPlot {
    profile: BeamProfile,
    lenses: Vec<Lens>,
    readings: Vec<ProbeReading>,
}
impl BeamPlot {
    /// Creates a new [`BeamPlot`] from pre-computed data.
    #[must_use]
    pub fn new(profile: BeamProfile, lenses: &[Lens], readings: Vec<ProbeReading>) -> Self {
        Self {
            profile,
            lenses: lenses.to_vec(),
            readings,
        }
    }
    /// Sample the given [`BeamPropagation`] as configured in the [`PlotOptions`] and create a
    /// [`BeamPlot`] from it.
    ///
    /// # Errors
    ///
    /// This function will return an error if the sampling range or the number of samples is invalid.
    pub fn from_propagation(
        propagation: &BeamPropagation,
        options: &PlotOptions,
    ) -> BpResult<Self> {
        if !propagation.is_derived() {
            warn!("segments not derived. Plotting the input beam only");
        }
        let profile = propagation.sample(options.x_min, options.x_max, options.samples)?;
        Ok(Self::new(
            profile,
            propagation.lenses(),
            propagation.probe_readings(),
        ))
    }
    /// Returns the sampled profile of this [`BeamPlot`].
    #[must_use]
    pub const fn profile(&self) -> &BeamProfile {
        &self.profile
    }
    /// Returns the probe readings of this [`BeamPlot`].
    #[must_use]
    pub fn readings(&self) -> &[ProbeReading] {
        &self.readings
    }
    /// Returns the limits of the x axis (in m): the sampled range widened by 10 %.
    ///
    /// # Errors
    ///
    /// This function will return an error if the profile does not span a valid range.
    pub fn x_limits(&self) -> BpResult<AxLims> {
        let mut x_lims = AxLims::finite_from_values(self.profile.positions().as_slice())
            .ok_or_else(|| BeamPropError::Plot("no valid x range to plot".into()))?;
        x_lims.expand_lim_range_by_factor(1.1);
        Ok(x_lims)
    }
    /// Returns the limits of the y axis (in mm).
    ///
    /// A valid `y_limit` of the [`PlotOptions`] gives symmetric limits. Otherwise, the limits
    /// enclose the beam envelope with a margin of 10 %.
    ///
    /// # Errors
    ///
    /// This function will return an error if no valid limits can be found.
    pub fn y_limits(&self, options: &PlotOptions) -> BpResult<AxLims> {
        if let Some(y_limit) = options.y_limit {
            if let Some(y_lims) = AxLims::symmetric(y_limit) {
                return Ok(y_lims);
            }
            warn!("y limit {y_limit} mm is invalid. Using data limits");
        }
        let max_radius = self
            .profile
            .spot_sizes()
            .iter()
            .copied()
            .filter(|w| w.is_finite())
            .fold(0.0, f64::max)
            * 1.0e3;
        let mut y_lims = AxLims::create_useful_axlims(-max_radius, max_radius)
            .ok_or_else(|| BeamPropError::Plot("no valid y range to plot".into()))?;
        y_lims.expand_lim_range_by_factor(1.1);
        Ok(y_lims)
    }
    /// Returns the lens markers for the given axis limits.
    ///
    /// Each ellipse is 0.8 % of the x span wide and 75 % of the y span high.
    #[must_use]
    pub fn lens_markers(&self, x_lims: AxLims, y_lims: AxLims) -> Vec<LensMarker> {
        self.lenses
            .iter()
            .map(|lens| LensMarker {
                position: lens.position().get::<meter>(),
                width: x_lims.range() * 0.008,
                height: y_lims.range() * 0.75,
            })
            .collect()
    }
    /// Returns the probe markers for the given axis limits.
    ///
    /// The label is placed 0.5 % of the x span right of the probe and 5 % of the y span above
    /// the bottom of the plot.
    #[must_use]
    pub fn probe_markers(&self, x_lims: AxLims, y_lims: AxLims) -> Vec<ProbeMarker> {
        self.readings
            .iter()
            .map(|reading| {
                let position = reading.position().get::<meter>();
                ProbeMarker {
                    position,
                    line: [(position, y_lims.min), (position, y_lims.max)],
                    label: reading.label(),
                    label_anchor: (
                        x_lims.range().mul_add(0.005, position),
                        y_lims.range().mul_add(0.05, y_lims.min),
                    ),
                }
            })
            .collect()
    }
    /// Render this [`BeamPlot`] with the backend selected in the [`PlotOptions`].
    ///
    /// For file backends, the plot is written to `path` and `None` is returned. The
    /// [`PltBackEnd::Buf`] backend ignores the path and returns the image.
    ///
    /// # Errors
    ///
    /// This function will return an error if the figure size is zero, no valid axis limits are
    /// found, or the backend fails.
    pub fn render(&self, options: &PlotOptions, path: &Path) -> BpResult<Option<RgbImage>> {
        let fig_size = options.fig_size;
        if fig_size.0 == 0 || fig_size.1 == 0 {
            return Err(BeamPropError::Plot("figure size must not be zero".into()));
        }
        match options.backend {
            PltBackEnd::Bitmap => {
                let root = BitMapBackend::new(path, fig_size).into_drawing_area();
                self.draw(&root, options)?;
                info!("plot written to {}", path.display());
                Ok(None)
            }
            PltBackEnd::SVG => {
                let root = SVGBackend::new(path, fig_size).into_drawing_area();
                self.draw(&root, options)?;
                info!("plot written to {}", path.display());
                Ok(None)
            }
            PltBackEnd::Buf => {
                let mut image_buffer = vec![0; image_buffer_size(fig_size)?];
                {
                    let root = BitMapBackend::with_buffer(&mut image_buffer, fig_size)
                        .into_drawing_area();
                    self.draw(&root, options)?;
                }
                let img = RgbImage::from_raw(fig_size.0, fig_size.1, image_buffer)
                    .ok_or_else(|| BeamPropError::Plot("image buffer size too small".into()))?;
                Ok(Some(img))
            }
        }
    }
    fn draw<B: DrawingBackend>(
        &self,
        root: &DrawingArea<B, Shift>,
        options: &PlotOptions,
    ) -> BpResult<()> {
        let x_lims = self.x_limits()?;
        let y_lims = self.y_limits(options)?;
        root.fill(&WHITE).map_err(plot_error)?;
        let mut chart = ChartBuilder::on(root)
            .margin(30)
            .x_label_area_size(65)
            .y_label_area_size(100)
            .build_cartesian_2d(x_lims.min..x_lims.max, y_lims.min..y_lims.max)
            .map_err(plot_error)?;
        chart
            .configure_mesh()
            .x_labels(10)
            .y_labels(5)
            .y_desc("Spot size (mm)")
            .label_style(("sans-serif", 24).into_font())
            .draw()
            .map_err(plot_error)?;
        self.draw_envelope(&mut chart, y_lims)?;
        if options.show_segments {
            self.draw_segment_curves(&mut chart, y_lims)?;
        }
        let grey = palette_color(7);
        chart
            .draw_series(
                self.lens_markers(x_lims, y_lims)
                    .iter()
                    .map(|marker| {
                        Polygon::new(
                            marker.outline(LENS_OUTLINE_POINTS),
                            grey.mix(0.7).filled(),
                        )
                    }),
            )
            .map_err(plot_error)?;
        let red = palette_color(3);
        let probe_markers = self.probe_markers(x_lims, y_lims);
        chart
            .draw_series(
                probe_markers
                    .iter()
                    .map(|marker| PathElement::new(marker.line.to_vec(), red.stroke_width(2))),
            )
            .map_err(plot_error)?;
        let label_style = TextStyle::from(("sans-serif", 24).into_font())
            .pos(Pos::new(HPos::Left, VPos::Bottom));
        chart
            .draw_series(probe_markers.iter().map(|marker| {
                Text::new(marker.label.clone(), marker.label_anchor, label_style.clone())
            }))
            .map_err(plot_error)?;
        root.present().map_err(plot_error)
    }
    fn draw_envelope<B: DrawingBackend>(
        &self,
        chart: &mut BeamChart<'_, B>,
        y_lims: AxLims,
    ) -> BpResult<()> {
        let blue = palette_color(0);
        let positions = self.profile.positions().as_slice();
        let (upper, lower) = self.profile.envelope();
        let upper = clamp_to_mm(upper.as_slice(), y_lims);
        let lower = clamp_to_mm(lower.as_slice(), y_lims);
        let fill: Vec<(f64, f64)> = izip!(positions.iter(), upper.iter())
            .chain(izip!(positions.iter(), lower.iter()).rev())
            .map(|(z, w)| (*z, *w))
            .collect();
        chart
            .draw_series(std::iter::once(Polygon::new(fill, blue.mix(0.3).filled())))
            .map_err(plot_error)?;
        for radii in [upper, lower] {
            chart
                .draw_series(LineSeries::new(
                    izip!(positions.iter(), radii).map(|(z, w)| (*z, w)),
                    blue.stroke_width(2),
                ))
                .map_err(plot_error)?;
        }
        Ok(())
    }
    fn draw_segment_curves<B: DrawingBackend>(
        &self,
        chart: &mut BeamChart<'_, B>,
        y_lims: AxLims,
    ) -> BpResult<()> {
        let positions = self.profile.positions();
        for (i, curve) in self.profile.segment_curves().iter().enumerate() {
            let color = palette_color(i + 1);
            let radii = clamp_to_mm(curve.as_slice(), y_lims);
            chart
                .draw_series(LineSeries::new(
                    izip!(positions.iter(), radii).map(|(z, w)| (*z, w)),
                    color.stroke_width(1),
                ))
                .map_err(plot_error)?;
        }
        Ok(())
    }
}

/// Scale radii from m to mm and clamp them to the plotted y range.
fn clamp_to_mm(radii: &[f64], y_lims: AxLims) -> Vec<f64> {
    radii
        .iter()
        .map(|w| (w * 1.0e3).clamp(y_lims.min, y_lims.max))
        .collect()
}

/// Number of bytes of an RGB image buffer with the given size in pixels.
fn image_buffer_size(fig_size: (u32, u32)) -> BpResult<usize> {
    usize::try_from(fig_size.0)
        .ok()
        .zip(usize::try_from(fig_size.1).ok())
        .and_then(|(width, height)| width.checked_mul(height))
        .and_then(|pixels| pixels.checked_mul(RGBPixel::PIXEL_SIZE))
        .ok_or_else(|| {
            BeamPropError::Plot(format!(
                "figure size {}x{} is too large for an image buffer",
                fig_size.0, fig_size.1
            ))
        })
}

fn palette_color(index: usize) -> RGBColor {
    let c = colorous::CATEGORY10[index % colorous::CATEGORY10.len()];
    RGBColor(c.r, c.g, c.b)
}

fn plot_error<E: std::fmt::Display>(e: E) -> BeamPropError {
    BeamPropError::Plot(e.to_string())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        beam_segment::BeamSegment, meter, micrometer, nanometer, optical_element::Probe,
        utils::test_helper::test_helper::check_warnings,
    };
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn propagation() -> BeamPropagation {
        let beam = BeamSegment::new(nanometer!(1064.0), micrometer!(100.0), meter!(0.0)).unwrap();
        let mut propagation = BeamPropagation::new(beam);
        propagation
            .add_element(Lens::new(meter!(0.2), meter!(0.1)).unwrap())
            .unwrap();
        propagation
            .add_element(Probe::new(meter!(0.4)).unwrap())
            .unwrap();
        propagation.derive_segments().unwrap();
        propagation
    }
    fn plot() -> BeamPlot {
        BeamPlot::from_propagation(&propagation(), &PlotOptions::default()).unwrap()
    }
    #[test]
    fn backend_from_path() {
        assert_eq!(PltBackEnd::from_path(Path::new("plot.svg")), PltBackEnd::SVG);
        assert_eq!(PltBackEnd::from_path(Path::new("plot.SVG")), PltBackEnd::SVG);
        assert_eq!(
            PltBackEnd::from_path(Path::new("plot.png")),
            PltBackEnd::Bitmap
        );
        assert_eq!(PltBackEnd::from_path(Path::new("plot")), PltBackEnd::Bitmap);
    }
    #[test]
    fn default_options() {
        let options = PlotOptions::default();
        assert_eq!(options.fig_size, (2000, 300));
        assert_eq!(options.x_min, meter!(-0.1));
        assert_eq!(options.x_max, meter!(0.5));
        assert_eq!(options.samples, 1000);
        assert_eq!(options.y_limit, None);
        assert!(!options.show_segments);
        assert_eq!(options.backend, PltBackEnd::Bitmap);
    }
    #[test]
    fn deserialize_options() {
        let options: PlotOptions =
            serde_yaml::from_str("x_max: 0.8\ny_limit: 1.0\nfig_size: [800, 200]\n").unwrap();
        assert_eq!(options.x_min, meter!(-0.1));
        assert_eq!(options.x_max, meter!(0.8));
        assert_eq!(options.y_limit, Some(1.0));
        assert_eq!(options.fig_size, (800, 200));
        assert!(serde_yaml::from_str::<PlotOptions>("color: red\n").is_err());
    }
    #[test]
    fn from_propagation() {
        let plot = plot();
        assert_eq!(plot.profile().len(), 1000);
        assert_eq!(plot.readings().len(), 1);
        assert_eq!(plot.readings()[0].position(), meter!(0.4));
    }
    #[test]
    fn x_limits() {
        let x_lims = plot().x_limits().unwrap();
        assert_relative_eq!(x_lims.min, -0.13, max_relative = 1e-9);
        assert_relative_eq!(x_lims.max, 0.53, max_relative = 1e-9);
    }
    #[test]
    fn y_limits() {
        let plot = plot();
        let options = PlotOptions {
            y_limit: Some(1.5),
            ..PlotOptions::default()
        };
        let y_lims = plot.y_limits(&options).unwrap();
        assert_eq!(y_lims.min, -1.5);
        assert_eq!(y_lims.max, 1.5);

        let max_radius = plot.profile().spot_sizes().max() * 1.0e3;
        let y_lims = plot.y_limits(&PlotOptions::default()).unwrap();
        assert_relative_eq!(y_lims.max, 1.1 * max_radius, max_relative = 1e-9);
        assert_relative_eq!(y_lims.min, -1.1 * max_radius, max_relative = 1e-9);
    }
    #[test]
    fn y_limits_invalid() {
        let plot = plot();
        let options = PlotOptions {
            y_limit: Some(-1.0),
            ..PlotOptions::default()
        };
        testing_logger::setup();
        let y_lims = plot.y_limits(&options).unwrap();
        check_warnings(vec![
            "Invalid axis limits. Must be finite and min < max. Use default",
            "y limit -1 mm is invalid. Using data limits",
        ]);
        assert!(y_lims.max > 0.0);
    }
    #[test]
    fn lens_markers() {
        let plot = plot();
        let x_lims = AxLims::new(-0.1, 0.5).unwrap();
        let y_lims = AxLims::new(-2.0, 2.0).unwrap();
        let markers = plot.lens_markers(x_lims, y_lims);
        assert_eq!(markers.len(), 1);
        assert_relative_eq!(markers[0].position, 0.2);
        assert_relative_eq!(markers[0].width, 0.0048, max_relative = 1e-9);
        assert_relative_eq!(markers[0].height, 3.0);
    }
    #[test]
    fn lens_outline() {
        let marker = LensMarker {
            position: 0.2,
            width: 0.01,
            height: 3.0,
        };
        let outline = marker.outline(4);
        assert_eq!(outline.len(), 4);
        assert_relative_eq!(outline[0].0, 0.205);
        assert_relative_eq!(outline[0].1, 0.0);
        assert_relative_eq!(outline[1].0, 0.2, epsilon = 1e-12);
        assert_relative_eq!(outline[1].1, 1.5);
        assert_relative_eq!(outline[2].0, 0.195);
        assert_relative_eq!(outline[3].1, -1.5);
    }
    #[test]
    fn probe_markers() {
        let plot = plot();
        let x_lims = AxLims::new(-0.1, 0.5).unwrap();
        let y_lims = AxLims::new(-2.0, 2.0).unwrap();
        let markers = plot.probe_markers(x_lims, y_lims);
        assert_eq!(markers.len(), 1);
        assert_relative_eq!(markers[0].position, 0.4);
        assert_eq!(markers[0].line, [(0.4, -2.0), (0.4, 2.0)]);
        assert_eq!(markers[0].label, "w(0.4) = 1.0e-04");
        assert_relative_eq!(markers[0].label_anchor.0, 0.403, max_relative = 1e-9);
        assert_relative_eq!(markers[0].label_anchor.1, -1.8, max_relative = 1e-9);
    }
    #[test]
    fn clamp_radii() {
        let y_lims = AxLims::new(-1.0, 1.0).unwrap();
        assert_eq!(
            clamp_to_mm(&[0.5e-3, 2.0e-3, -3.0e-3], y_lims),
            vec![0.5, 1.0, -1.0]
        );
    }
    #[test]
    fn buffer_size() {
        assert_eq!(image_buffer_size((2000, 300)).unwrap(), 1_800_000);
        assert_eq!(image_buffer_size((0, 300)).unwrap(), 0);
        assert_matches!(
            image_buffer_size((u32::MAX, u32::MAX)),
            Err(BeamPropError::Plot(_))
        );
    }
    #[test]
    fn render_buffer_too_large() {
        let options = PlotOptions {
            fig_size: (u32::MAX, u32::MAX),
            backend: PltBackEnd::Buf,
            ..PlotOptions::default()
        };
        assert_matches!(
            plot().render(&options, &PathBuf::from("unused.png")),
            Err(BeamPropError::Plot(_))
        );
    }
    #[test]
    fn palette() {
        assert_eq!(palette_color(0), RGBColor(0x1f, 0x77, 0xb4));
        assert_eq!(palette_color(3), RGBColor(0xd6, 0x27, 0x28));
        assert_eq!(palette_color(10), palette_color(0));
    }
    #[test]
    fn render_zero_size() {
        let options = PlotOptions {
            fig_size: (0, 300),
            ..PlotOptions::default()
        };
        assert_matches!(
            plot().render(&options, &PathBuf::from("unused.png")),
            Err(BeamPropError::Plot(_))
        );
    }
    #[test]
    fn render_svg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("beam.svg");
        let options = PlotOptions {
            backend: PltBackEnd::SVG,
            show_segments: true,
            ..PlotOptions::default()
        };
        // text rendering depends on the fonts available on the system
        match plot().render(&options, &path) {
            Ok(image) => {
                assert!(image.is_none());
                assert!(path.exists());
            }
            Err(e) => assert_matches!(e, BeamPropError::Plot(_)),
        }
    }
}
