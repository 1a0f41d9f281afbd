// Prints `log` records above a running bar.
//
//   RUST_LOG=debug cargo run --example logging
use std::thread;
use std::time::Duration;

fn main() -> tally::Result<()> {
    tally::log_init("info");
    let bar = tally::progress("processing [:bar] :current/:total :elapsed")
        .total(50)
        .width(30)
        .build()?;
    tally::attach_log_target(&bar);
    bar.start()?;
    for i in 0..50u64 {
        thread::sleep(Duration::from_millis(40));
        if i % 10 == 0 {
            tally::info!("reached item {i}");
        }
        tally::debug!("item {i}");
        bar.advance(1)?;
    }
    tally::detach_log_target();
    tally::info!("finished, this goes to stderr");
    Ok(())
}
