use crate::chart::line_chart;
use std::fmt::Write;
use stockdx_core::config::{DisplayConfig, Layout};
use stockdx_core::diagnosis::{DiagnoseError, Diagnosis};
use stockdx_core::domain::recommendation::Severity;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #262730; }
main { margin: 0 auto; padding: 1.5rem; }
body.layout-centered main { max-width: 46rem; }
body.layout-wide main { max-width: none; }
.sidebar { position: fixed; top: 0.5rem; left: 0.5rem; font-size: 0.9rem; max-width: 16rem; }
form { display: flex; gap: 0.5rem; align-items: flex-end; }
form label { flex: 3; display: flex; flex-direction: column; }
form button { flex: 1; padding: 0.45rem; }
.metrics, .columns { display: flex; gap: 1rem; }
.metric, .column { flex: 1; }
.metric .label { display: block; font-weight: 600; font-size: 0.85rem; }
.metric .value { font-size: 1.8rem; }
.alert { padding: 0.75rem 1rem; border-radius: 0.4rem; margin: 0.5rem 0; }
.alert.warning { background: #fffce7; }
.alert.success { background: #e8f9ee; }
.alert.info { background: #e7f2fe; }
.alert.error { background: #ffeded; }
.chart { width: 100%; height: auto; }
.loading { font-style: italic; }
footer { color: #808495; }
"#;

/// Full page: form, then either nothing, a report, or one error banner.
pub fn page(
    display: &DisplayConfig,
    input: Option<&str>,
    outcome: Option<&Result<Diagnosis, DiagnoseError>>,
) -> String {
    let title = escape(&display.page_title);
    let layout = match display.layout {
        Layout::Centered => "layout-centered",
        Layout::Wide => "layout-wide",
    };
    let sidebar_open = if display.sidebar_collapsed { "" } else { " open" };
    let echo = escape(input.unwrap_or(&display.default_code));

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body class="{layout}">
<details class="sidebar"{sidebar_open}><summary>About</summary>
<p>Numeric codes are looked up on the listed market first (.TW), then on the OTC market (.TWO). Other symbols are used as entered.</p>
</details>
<main>
<h1>{title}</h1>
<hr>
<p>Enter a stock code. Listed (.TW) and OTC (.TWO) markets are detected automatically.</p>
<form method="get" action="/diagnose" onsubmit="document.getElementById('loading').hidden = false;">
<label for="code">Stock code (e.g. 2330 or 5314):
<input id="code" name="code" value="{echo}" autocomplete="off">
</label>
<button type="submit">📊 Diagnose</button>
</form>
<p id="loading" class="loading" hidden>Analyzing {echo}...</p>
"#
    );

    match outcome {
        Some(Ok(d)) => out.push_str(&report(d)),
        Some(Err(err)) => {
            let _ = write!(
                out,
                r#"<div class="alert error">{}</div>"#,
                escape(&err.user_message())
            );
        }
        None => {}
    }

    let _ = write!(
        out,
        "\n<hr>\n<footer><small>{}</small></footer>\n</main>\n</body>\n</html>\n",
        escape(&display.disclaimer)
    );
    out
}

fn report(d: &Diagnosis) -> String {
    let ind = &d.indicators;
    let rec = &d.recommendation;

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<section class="report">
<h3>🔍 <strong>{}</strong> ({}) diagnosis report</h3>
<p><small>Latest bar: {}</small></p>
<div class="metrics">
<div class="metric"><span class="label">Current price</span><span class="value">{:.2}</span></div>
<div class="metric"><span class="label">MA20</span><span class="value">{:.2}</span></div>
<div class="metric"><span class="label">MA20 bias</span><span class="value">{:.2}%</span></div>
</div>
<hr>
<div class="columns">
<div class="column">
<h4>📥 Buy strategy</h4>
{}
<p>{}</p>
</div>
<div class="column">
<h4>📤 Sell strategy</h4>
<p>💰 Profit target: <strong>{:.2}</strong></p>
<p>🚨 Stop loss: <strong>{:.2}</strong> (close below MA20)</p>
</div>
</div>
<hr>
"#,
        escape(&d.name),
        escape(&d.symbol),
        d.as_of,
        ind.close,
        ind.ma20,
        ind.bias_pct,
        alert(rec.buy.severity(), rec.buy.headline()),
        escape(&rec.buy.detail()),
        rec.profit_target,
        rec.stop_loss,
    );

    if let (Some(severity), Some(msg)) = (rec.volume.severity(), rec.volume.message()) {
        out.push_str(&alert(severity, &msg));
    }
    if let Some(trend) = rec.trend {
        out.push_str(&alert(trend.severity(), trend.message()));
    }

    out.push_str(&line_chart(&d.chart));
    out.push_str("\n</section>");
    out
}

fn alert(severity: Severity, msg: &str) -> String {
    let class = match severity {
        Severity::Warning => "warning",
        Severity::Success => "success",
        Severity::Info => "info",
    };
    format!(r#"<div class="alert {class}">{}</div>"#, escape(msg))
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
