use itertools::Itertools;
use log::debug;
use plotly::{
    color::NamedColor,
    common::{ColorScale, ColorScalePalette, Line, Marker, Mode, Title},
    layout::{Axis, Layout},
    Plot, Scatter,
};

use eclipse_dtec::prelude::{Epoch, MapFrame, MapQuantity, TotalityPath};

use std::path::Path;

/// Contiguous United States
const LONGITUDE_RANGE: [f64; 2] = [-130.0, -60.0];
const LATITUDE_RANGE: [f64; 2] = [20.0, 55.0];

/// `HH:MM:SS` of this posix time
fn time_of_day(posix: i64) -> String {
    let (_, _, _, hh, mm, ss, _) = Epoch::from_unix_seconds(posix as f64).to_gregorian_utc();
    format!("{:02}:{:02}:{:02}", hh, mm, ss)
}

/// Scatter map renderer
pub struct MapPlotter<'a> {
    quantity: MapQuantity,
    cmin: f64,
    cmax: f64,
    totality: Option<&'a TotalityPath>,
}

impl<'a> MapPlotter<'a> {
    pub fn new(
        quantity: MapQuantity,
        (cmin, cmax): (f64, f64),
        totality: Option<&'a TotalityPath>,
    ) -> Self {
        Self {
            quantity,
            cmin,
            cmax,
            totality,
        }
    }

    fn layout(&self, frame: &MapFrame) -> Layout {
        Layout::new()
            .title(Title::with_text(format!(
                "{} (TECu) - Time: {} UTC",
                self.quantity,
                time_of_day(frame.time)
            )))
            .x_axis(
                Axis::new()
                    .title(Title::with_text("Longitude (°)"))
                    .range(LONGITUDE_RANGE.to_vec()),
            )
            .y_axis(
                Axis::new()
                    .title(Title::with_text("Latitude (°)"))
                    .range(LATITUDE_RANGE.to_vec()),
            )
            .width(1200)
            .height(800)
    }

    /// Renders this [MapFrame]
    pub fn plot(&self, frame: &MapFrame) -> Plot {
        let mut plot = Plot::new();

        let (lon, lat): (Vec<f64>, Vec<f64>) = frame
            .points
            .iter()
            .map(|point| (point.lon_deg, point.lat_deg))
            .unzip();

        let values = frame.points.iter().map(|point| point.value).collect::<Vec<_>>();

        let labels = frame
            .points
            .iter()
            .map(|point| format!("{}({})", point.receiver, point.sv))
            .collect::<Vec<_>>();

        let trace = Scatter::new(lon, lat)
            .mode(Mode::Markers)
            .name(&self.quantity.to_string())
            .text_array(labels)
            .marker(
                Marker::new()
                    .size(5)
                    .color_array(values)
                    .color_scale(ColorScale::Palette(ColorScalePalette::Jet))
                    .cmin(self.cmin)
                    .cmax(self.cmax)
                    .show_scale(true),
            );

        plot.add_trace(trace);

        if let Some(totality) = self.totality {
            let limits = [("north limit", &totality.north), ("south limit", &totality.south)];
            for (name, limit) in limits {
                let (lat, lon): (Vec<f64>, Vec<f64>) = limit.iter().copied().unzip();
                let trace = Scatter::new(lon, lat)
                    .mode(Mode::Lines)
                    .name(name)
                    .line(Line::new().color(NamedColor::Black).width(1.5));
                plot.add_trace(trace);
            }
        }

        plot.set_layout(self.layout(frame));
        plot
    }

    /// Renders this [MapFrame] into `{time}.html` within this directory
    pub fn render(&self, frame: &MapFrame, directory: &Path) {
        let path = directory.join(format!("{}.html", frame.time));
        self.plot(frame).write_html(&path);
        debug!(
            "{} - {} points from {} receivers",
            path.display(),
            frame.points.len(),
            frame.points.iter().map(|p| &*p.receiver).unique().count()
        );
    }
}
