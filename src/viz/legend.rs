//! Legend panel drawing for the external and overlay placements.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::{estimate_text_width_px, truncate_to_width};
use super::types::LegendMode;
use crate::layout::{LayoutConfig, LegendEntry};

const FONT_PX: u32 = 13;
const SWATCH_R: i32 = 5;
const ROW_H: i32 = 20;
const GAP: i32 = 8;

fn label_style() -> TextStyle<'static> {
    TextStyle::from((FontFamily::SansSerif, FONT_PX).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center))
}

/// Draw one entry (swatch + label) with the text capped at `max_text_px`.
fn draw_entry<DB>(
    area: &DrawingArea<DB, Shift>,
    entry: &LegendEntry,
    x: i32,
    y: i32,
    max_text_px: u32,
) -> Result<()>
where
    DB: DrawingBackend,
{
    area.draw(&Circle::new((x, y), SWATCH_R, entry.color.filled()))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let label = truncate_to_width(&entry.label, FONT_PX, max_text_px);
    area.draw(&Text::new(label, (x + SWATCH_R + GAP, y), label_style()))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(())
}

/// Pixel width one entry occupies in a horizontal flow.
fn entry_width(entry: &LegendEntry) -> i32 {
    SWATCH_R * 2 + GAP + estimate_text_width_px(&entry.label, FONT_PX) as i32 + 3 * GAP
}

/// Draw the legend into the gutter reserved by the layout margins.
///
/// `Right` lists entries vertically in the right margin; `Bottom` flows them
/// in rows under the x-axis labels, wrapping at the canvas edge; `Inside`
/// overlays a boxed list in the plot's upper-left corner.
pub fn draw_legend_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    entries: &[LegendEntry],
    mode: LegendMode,
    config: &LayoutConfig,
) -> Result<()>
where
    DB: DrawingBackend,
{
    if entries.is_empty() {
        return Ok(());
    }
    let w = config.width as i32;
    let h = config.height as i32;

    match mode {
        LegendMode::Right => {
            let x = w - config.margin_right as i32 + 2 * GAP;
            let max_text = (w - x - SWATCH_R * 2 - 2 * GAP).max(30) as u32;
            let mut y = config.margin_top as i32 + ROW_H / 2;
            for entry in entries {
                draw_entry(area, entry, x, y, max_text)?;
                y += ROW_H;
            }
        }
        LegendMode::Bottom => {
            let x_start = config.margin_left as i32;
            let mut x = x_start;
            let mut y = h - config.margin_bottom as i32 + 44;
            for entry in entries {
                let bw = entry_width(entry);
                if x + bw > w - GAP && x > x_start {
                    x = x_start;
                    y += ROW_H;
                }
                draw_entry(area, entry, x, y, (bw - SWATCH_R * 2 - GAP) as u32)?;
                x += bw;
            }
        }
        LegendMode::Inside => {
            let x0 = config.margin_left as i32 + GAP;
            let y0 = config.margin_top as i32 + GAP;
            let text_w = entries
                .iter()
                .map(|e| estimate_text_width_px(&e.label, FONT_PX) as i32)
                .max()
                .unwrap_or(0);
            let box_w = SWATCH_R * 2 + GAP * 3 + text_w;
            let box_h = ROW_H * entries.len() as i32 + GAP;
            area.draw(&Rectangle::new(
                [(x0, y0), (x0 + box_w, y0 + box_h)],
                WHITE.mix(0.85).filled(),
            ))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            area.draw(&Rectangle::new(
                [(x0, y0), (x0 + box_w, y0 + box_h)],
                BLACK.stroke_width(1),
            ))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            let mut y = y0 + ROW_H / 2 + GAP / 2;
            for entry in entries {
                draw_entry(area, entry, x0 + GAP, y, text_w as u32)?;
                y += ROW_H;
            }
        }
    }
    Ok(())
}
