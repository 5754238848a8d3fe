use std::fmt::Write;
use stockdx_core::diagnosis::ChartPoint;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 280.0;
const PAD_LEFT: f64 = 56.0;
const PAD_RIGHT: f64 = 12.0;
const PAD_TOP: f64 = 28.0;
const PAD_BOTTOM: f64 = 28.0;

const CLOSE_COLOR: &str = "#1f77b4";
const MA20_COLOR: &str = "#ff7f0e";

/// Two-series line chart (close, MA20) as inline SVG. Empty input renders nothing.
pub fn line_chart(points: &[ChartPoint]) -> String {
    if points.is_empty() {
        return String::new();
    }

    let values = points
        .iter()
        .flat_map(|p| std::iter::once(p.close).chain(p.ma20))
        .filter(|v| v.is_finite());
    let (mut lo, mut hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return String::new();
    }
    if hi - lo < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }

    let plot_w = WIDTH - PAD_LEFT - PAD_RIGHT;
    let plot_h = HEIGHT - PAD_TOP - PAD_BOTTOM;
    let n = points.len();
    let x = |i: usize| {
        if n == 1 {
            PAD_LEFT + plot_w / 2.0
        } else {
            PAD_LEFT + plot_w * i as f64 / (n - 1) as f64
        }
    };
    let y = |v: f64| PAD_TOP + plot_h * (hi - v) / (hi - lo);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="Close price and MA20" xmlns="http://www.w3.org/2000/svg">"#
    );
    let _ = write!(
        svg,
        r##"<rect x="{PAD_LEFT}" y="{PAD_TOP}" width="{plot_w}" height="{plot_h}" fill="none" stroke="#ddd"/>"##
    );

    // Axis labels.
    let _ = write!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="11">{hi:.2}</text>"#,
        PAD_LEFT - 4.0,
        PAD_TOP + 4.0
    );
    let _ = write!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="11">{lo:.2}</text>"#,
        PAD_LEFT - 4.0,
        PAD_TOP + plot_h
    );
    let _ = write!(
        svg,
        r#"<text x="{PAD_LEFT}" y="{:.1}" font-size="11">{}</text>"#,
        HEIGHT - 8.0,
        points[0].date
    );
    let _ = write!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="11">{}</text>"#,
        WIDTH - PAD_RIGHT,
        HEIGHT - 8.0,
        points[n - 1].date
    );

    let close: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (x(i), y(p.close)))
        .collect();
    push_polyline(&mut svg, &close, CLOSE_COLOR, "close");

    // MA20 is undefined for the leading bars; draw each defined run separately.
    let mut run: Vec<(f64, f64)> = Vec::new();
    for (i, p) in points.iter().enumerate() {
        match p.ma20 {
            Some(v) => run.push((x(i), y(v))),
            None if !run.is_empty() => {
                push_polyline(&mut svg, &run, MA20_COLOR, "ma20");
                run.clear();
            }
            None => {}
        }
    }
    if !run.is_empty() {
        push_polyline(&mut svg, &run, MA20_COLOR, "ma20");
    }

    // Legend.
    let _ = write!(
        svg,
        r#"<text x="{PAD_LEFT}" y="16" font-size="12" fill="{CLOSE_COLOR}">■ Close</text><text x="{:.1}" y="16" font-size="12" fill="{MA20_COLOR}">■ MA20</text>"#,
        PAD_LEFT + 64.0
    );

    svg.push_str("</svg>");
    svg
}

fn push_polyline(svg: &mut String, pts: &[(f64, f64)], color: &str, class: &str) {
    let coords = pts
        .iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = write!(
        svg,
        r#"<polyline class="{class}" fill="none" stroke="{color}" stroke-width="1.5" points="{coords}"/>"#
    );
}
