// Runs one worker thread per bar in a shared block.
//
//   cargo run --example multi -- --bars 4 --top
use std::thread;
use std::time::Duration;

use clap::Parser;

#[derive(Debug, Parser)]
struct Args {
    /// Number of bars
    #[clap(short, long, default_value_t = 3)]
    bars: usize,
    /// Draw an aggregate bar above the others
    #[clap(long)]
    top: bool,
    /// Stop every bar halfway
    #[clap(long)]
    stop: bool,
    /// Milliseconds between steps
    #[clap(long, default_value_t = 20)]
    delay: u64,
}

fn main() -> tally::Result<()> {
    let args = Args::parse();
    let mut builder = tally::MultiProgress::builder();
    if args.top {
        builder = builder.top("[:bar] :current/:total :percent");
    }
    let multi = builder.build()?;
    multi.on(tally::Event::Done, || eprintln!("all done"));

    let bars = (0..args.bars)
        .map(|i| {
            let total = 20 + 10 * i as u64;
            multi.register(
                tally::progress(format!("worker {i} [:bar] :current/:total :rate/s"))
                    .total(total)
                    .width(30),
            )
        })
        .collect::<tally::Result<Vec<_>>>()?;
    multi.start()?;

    thread::scope(|s| {
        for (i, bar) in bars.iter().enumerate() {
            let multi = &multi;
            s.spawn(move || -> tally::Result<()> {
                let delay = Duration::from_millis(args.delay * (i as u64 + 1));
                while !bar.is_finished() {
                    thread::sleep(delay);
                    bar.advance(1)?;
                    if args.stop && bar.ratio() >= 0.5 {
                        bar.stop()?;
                    }
                    if bar.current() == 10 {
                        multi.log(format!("worker {i} is 10 steps in"))?;
                    }
                }
                Ok(())
            });
        }
    });
    Ok(())
}
