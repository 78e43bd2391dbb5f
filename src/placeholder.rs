// Placeholder figure shared by every chart

use crate::chart::{Annotation, ChartBody, ChartDescription, ChartId, Font, Styling};

pub const BACKGROUND: &str = "white";
pub const TEXT_COLOR: &str = "#333333";
pub const FONT_SIZE: u32 = 12;
pub const PLACEHOLDER_FONT_SIZE: u32 = 20;

/// Styling shared by every populated chart.
pub fn chart_styling() -> Styling {
    Styling {
        plot_background: BACKGROUND.to_string(),
        paper_background: BACKGROUND.to_string(),
        font: Font {
            size: FONT_SIZE,
            color: TEXT_COLOR.to_string(),
        },
        show_legend: true,
    }
}

/// A chart with a centered message and no axes or legend.
pub fn empty_placeholder(chart: ChartId, message: impl Into<String>) -> ChartDescription {
    ChartDescription {
        chart,
        body: ChartBody::Empty {
            annotation: Annotation {
                text: message.into(),
                x: 0.5,
                y: 0.5,
                font: Font {
                    size: PLACEHOLDER_FONT_SIZE,
                    color: TEXT_COLOR.to_string(),
                },
            },
        },
        style: Styling {
            show_legend: false,
            ..chart_styling()
        },
    }
}
