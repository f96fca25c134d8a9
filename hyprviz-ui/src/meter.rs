use eframe::egui::{Rect, Response, Sense, Stroke, Ui, Vec2, Widget, pos2};
use eframe::epaint::Color32;
use hyprviz_messages::{AudioSnapshot, Decibels};

/// Peak markers fall by this much (normalized units) per frame.
const PEAK_DECAY: f32 = 0.01;

/// Bar meter showing every band of the latest snapshot on a dB scale.
///
/// Values are set with [`update`](Self::update) before the widget is added.
/// Each bar also keeps a slowly falling peak marker.
pub struct BandMeter {
    names: Vec<String>,
    levels: Vec<f32>,
    peaks: Vec<f32>,
    sequence: u64,
}

impl BandMeter {
    pub fn new(names: &[String]) -> Self {
        Self {
            names: names.to_vec(),
            levels: vec![0.0; names.len()],
            peaks: vec![0.0; names.len()],
            sequence: 0,
        }
    }

    pub fn update(&mut self, snapshot: &AudioSnapshot) {
        self.sequence = snapshot.sequence();
        for ((level, peak), &value) in self
            .levels
            .iter_mut()
            .zip(self.peaks.iter_mut())
            .zip(snapshot.bands())
        {
            *level = Decibels::from_linear(value).normalized();
            *peak = (*peak - PEAK_DECAY).max(*level);
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    pub fn peaks(&self) -> &[f32] {
        &self.peaks
    }
}

impl Widget for &mut BandMeter {
    fn ui(self, ui: &mut Ui) -> Response {
        if self.levels.is_empty() {
            ui.label("No bands configured");
            return ui.response();
        }

        let size = Vec2::new(ui.available_width(), 120.0);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let rect = response.rect;
        painter.rect_filled(rect, 2.0, Color32::from_gray(20));

        let bar_width = rect.width() / self.levels.len() as f32;
        for (index, (&level, &peak)) in self.levels.iter().zip(&self.peaks).enumerate() {
            let left = rect.left() + index as f32 * bar_width;
            let right = left + bar_width - 1.0;
            let top = rect.bottom() - level * rect.height();
            painter.rect_filled(
                Rect::from_min_max(pos2(left, top), pos2(right, rect.bottom())),
                0.0,
                Color32::from_rgb(50, 230, 130),
            );

            let peak_y = rect.bottom() - peak * rect.height();
            painter.line_segment(
                [pos2(left, peak_y), pos2(right, peak_y)],
                Stroke::new(1.0, Color32::WHITE),
            );
        }

        let hover = self
            .names
            .iter()
            .zip(&self.levels)
            .map(|(name, level)| {
                let db = Decibels(Decibels::FLOOR.as_db() * (1.0 - level));
                format!("{name}: {db}")
            })
            .collect::<Vec<_>>()
            .join("\n");
        response.on_hover_text(hover)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_converts_to_normalized_db() {
        let names = vec!["loudness".to_owned(), "bass".to_owned()];
        let mut meter = BandMeter::new(&names);
        meter.update(&AudioSnapshot::from_bands(vec![1.0, 0.0]));

        assert_eq!(meter.levels(), &[1.0, 0.0]);
        assert_eq!(meter.peaks(), &[1.0, 0.0]);
    }

    #[test]
    fn peaks_decay_slowly() {
        let names = vec!["loudness".to_owned()];
        let mut meter = BandMeter::new(&names);
        meter.update(&AudioSnapshot::from_bands(vec![1.0]));
        meter.update(&AudioSnapshot::from_bands(vec![0.0]));

        assert_eq!(meter.levels(), &[0.0]);
        assert!((meter.peaks()[0] - (1.0 - PEAK_DECAY)).abs() < 1e-6);
    }
}
