// Draws one bar of each style, then a download-like bar with byte tokens.
use std::thread;
use std::time::Duration;

use tally::BarStyle;

fn main() -> tally::Result<()> {
    for style in [
        BarStyle::Classic,
        BarStyle::Arrow,
        BarStyle::Block,
        BarStyle::Box,
        BarStyle::Dot,
        BarStyle::Track,
    ] {
        let name = format!("{style:?}");
        let bar = tally::progress(format!("{name:<8} [:bar] :percent :eta"))
            .total(40)
            .width(40)
            .style(style)
            .hide_cursor(true)
            .build()?;
        bar.start()?;
        for _ in 0..40 {
            thread::sleep(Duration::from_millis(15));
            bar.advance(1)?;
        }
    }

    let total = 64 * 1024 * 1024;
    let bar = tally::progress("downloading [:bar] :current_byte/:total_byte :byte_rate/s")
        .total(total)
        .frequency(20.0)
        .clear_on_finish(true)
        .build()?;
    bar.start()?;
    let mut received = 0;
    while received < total {
        thread::sleep(Duration::from_millis(2));
        let chunk = 96 * 1024;
        received += chunk;
        bar.advance(chunk)?;
        if received % (16 * 1024 * 1024) < chunk {
            bar.log(format!("checkpoint at {}", tally::fmt::to_bytes(received as f64)))?;
        }
    }
    println!("downloaded {}", tally::fmt::to_bytes(total as f64));
    Ok(())
}
