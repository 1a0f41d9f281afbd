use crate::fmt::{to_bytes, to_time};
use crate::format::{BarView, TokenFormatter, render_bar};

/// Register the built-in tokens
pub(crate) fn load(formatter: &mut TokenFormatter) {
    formatter.use_fill_token("bar", render_bar);
    formatter.use_token("current", |v| v.current().to_string());
    formatter.use_token("total", |v| match v.total() {
        Some(total) => total.to_string(),
        None => "?".to_string(),
    });
    formatter.use_token("percent", percent);
    formatter.use_token("elapsed", |v| to_time(v.elapsed().as_secs_f64()));
    formatter.use_token("eta", eta);
    formatter.use_token("rate", |v| format!("{:.2}", v.rate()));
    formatter.use_token("mean_rate", |v| format!("{:.2}", v.mean_rate()));
    formatter.use_token("current_byte", |v| to_bytes(v.current() as f64));
    formatter.use_token("byte", |v| to_bytes(v.current() as f64));
    formatter.use_token("total_byte", |v| match v.total() {
        Some(total) => to_bytes(total as f64),
        None => "?".to_string(),
    });
    formatter.use_token("byte_rate", |v| to_bytes(v.rate()));
    formatter.use_token("mean_byte", |v| to_bytes(v.mean_rate()));
}

fn percent(view: &BarView<'_>) -> String {
    let percent = (view.ratio() * 100f64).floor() as u64;
    format!("{percent}%")
}

fn eta(view: &BarView<'_>) -> String {
    let ratio = view.ratio();
    if ratio <= 0f64 {
        return "--s".to_string();
    }
    let elapsed = view.elapsed().as_secs_f64();
    to_time(elapsed / ratio - elapsed)
}
