use std::fmt::Write;
use stockdx_core::diagnosis::Diagnosis;
use stockdx_core::domain::recommendation::Severity;

pub fn text_report(d: &Diagnosis) -> String {
    let ind = &d.indicators;
    let rec = &d.recommendation;

    let mut out = String::new();
    let _ = writeln!(out, "🔍 {} ({}) diagnosis report, latest bar {}", d.name, d.symbol, d.as_of);
    let _ = writeln!(out, "  Current price : {:.2}", ind.close);
    let _ = writeln!(out, "  MA20          : {:.2}", ind.ma20);
    let _ = writeln!(out, "  MA20 bias     : {:.2}%", ind.bias_pct);
    out.push('\n');

    let _ = writeln!(out, "📥 Buy strategy");
    let _ = writeln!(out, "  {} {}", tag(rec.buy.severity()), rec.buy.headline());
    let _ = writeln!(out, "  {}", rec.buy.detail());
    let _ = writeln!(out, "📤 Sell strategy");
    let _ = writeln!(out, "  💰 Profit target: {:.2}", rec.profit_target);
    let _ = writeln!(out, "  🚨 Stop loss: {:.2} (close below MA20)", rec.stop_loss);
    out.push('\n');

    if let (Some(severity), Some(msg)) = (rec.volume.severity(), rec.volume.message()) {
        let _ = writeln!(out, "{} {msg}", tag(severity));
    }
    if let Some(trend) = rec.trend {
        let _ = writeln!(out, "{} {}", tag(trend.severity()), trend.message());
    }
    out
}

fn tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Warning => "[warning]",
        Severity::Success => "[ok]",
        Severity::Info => "[info]",
    }
}
