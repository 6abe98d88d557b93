use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, Text};

use crate::color;
use crate::dashboard::present::GroupedBarChart;

// ---------------------------------------------------------------------------
// Grouped bar chart (quarter × status)
// ---------------------------------------------------------------------------

const BAR_WIDTH: f64 = 0.19;
const GROUP_SPAN: f64 = 1.0;

/// Render a [`GroupedBarChart`]: one bar cluster per quarter, one bar per
/// status. The percentage series draws its values above the bars.
pub fn grouped_bar_chart(ui: &mut Ui, id: &str, chart: &GroupedBarChart) {
    let n_series = chart.series.len().max(1);
    let x_of = |group: usize, series: usize| -> f64 {
        let center = group as f64 * GROUP_SPAN;
        center + (series as f64 - (n_series as f64 - 1.0) / 2.0) * BAR_WIDTH
    };

    let max_value = chart
        .series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0_f64, f64::max);
    let label_pad = (max_value * 0.04).max(0.5);

    let mut bar_charts = Vec::with_capacity(chart.series.len());
    for (si, series) in chart.series.iter().enumerate() {
        let fill = color::series_color(&series.name);
        let bars: Vec<Bar> = series
            .values
            .iter()
            .enumerate()
            .map(|(gi, &v)| {
                Bar::new(x_of(gi, si), v)
                    .width(BAR_WIDTH * 0.9)
                    .name(format!("Trimestre {}", gi + 1))
                    .fill(fill)
            })
            .collect();
        bar_charts.push(BarChart::new(bars).name(&series.name).color(fill));
    }

    let groups = chart.groups.clone();
    Plot::new(id.to_string())
        .legend(Legend::default())
        .height(320.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round() as i64;
            if (mark.value - idx as f64).abs() < 0.01 && idx >= 0 && (idx as usize) < groups.len() {
                groups[idx as usize].clone()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            for bc in bar_charts {
                plot_ui.bar_chart(bc);
            }

            // Percentage labels sit above their bars, not inside them.
            for (si, series) in chart.series.iter().enumerate() {
                if !series.percent_labels {
                    continue;
                }
                for (gi, &v) in series.values.iter().enumerate() {
                    let label = if v.fract() == 0.0 {
                        format!("{v:.0}%")
                    } else {
                        format!("{v}%")
                    };
                    plot_ui.text(Text::new(PlotPoint::new(x_of(gi, si), v + label_pad), label));
                }
            }
        });
    ui.add_space(10.0);
}
