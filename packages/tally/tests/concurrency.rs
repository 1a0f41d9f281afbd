use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use tally::{Event, MultiProgress, Output};

fn counter(bar: &tally::ProgressBar, event: Event) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let count2 = Arc::clone(&count);
    bar.on(event, move || {
        count2.fetch_add(1, Ordering::SeqCst);
    });
    count
}

#[test]
fn test_three_threads_one_bar() -> tally::Result<()> {
    let (out, capture) = Output::capture();
    let bar = tally::progress(":current/:total").total(20).output(out).build()?;
    let done = counter(&bar, Event::Done);
    let progress = counter(&bar, Event::Progress);
    bar.start()?;
    thread::scope(|s| {
        for n in [7, 7, 6] {
            let bar = &bar;
            s.spawn(move || {
                for _ in 0..n {
                    bar.advance(1).unwrap();
                }
            });
        }
    });
    assert_eq!(bar.current(), 20);
    assert!(bar.is_done());
    assert_eq!(done.load(Ordering::SeqCst), 1);
    assert_eq!(progress.load(Ordering::SeqCst), 19);
    let contents = capture.contents();
    assert_eq!(contents.matches("20/20").count(), 1);
    assert!(contents.ends_with("20/20\n"));
    Ok(())
}

#[test]
fn test_overshooting_threads_finish_once() -> tally::Result<()> {
    let (out, capture) = Output::capture();
    let bar = tally::progress(":current/:total").total(10).output(out).build()?;
    let done = counter(&bar, Event::Done);
    thread::scope(|s| {
        for _ in 0..4 {
            let bar = &bar;
            s.spawn(move || {
                for _ in 0..5 {
                    bar.advance(1).unwrap();
                }
            });
        }
    });
    assert_eq!(bar.current(), 10);
    assert_eq!(done.load(Ordering::SeqCst), 1);
    assert_eq!(capture.contents().matches("10/10").count(), 1);
    Ok(())
}

#[test]
fn test_threads_share_a_block() -> tally::Result<()> {
    let (out, capture) = Output::capture();
    let multi = MultiProgress::with_top("total :current/:total")
        .output(out)
        .build()?;
    let done = Arc::new(AtomicUsize::new(0));
    {
        let done = Arc::clone(&done);
        multi.on(Event::Done, move || {
            done.fetch_add(1, Ordering::SeqCst);
        });
    }
    let bars = [20, 30, 10]
        .into_iter()
        .enumerate()
        .map(|(i, total)| multi.register(tally::progress(format!("{i} :current/:total")).total(total)))
        .collect::<tally::Result<Vec<_>>>()?;
    multi.start()?;
    thread::scope(|s| {
        for bar in &bars {
            s.spawn(move || {
                while !bar.is_done() {
                    bar.advance(1).unwrap();
                }
            });
        }
        let multi = &multi;
        s.spawn(move || {
            for i in 0..5 {
                multi.log(format!("message {i}")).unwrap();
            }
        });
    });
    let rows: Vec<_> = bars.iter().map(|x| x.row()).collect();
    assert_eq!(rows, vec![Some(1), Some(2), Some(3)]);
    assert_eq!(multi.rows(), 4);
    assert!(multi.is_complete());
    assert!(multi.top().unwrap().is_done());
    assert_eq!(multi.current(), 60);
    assert_eq!(done.load(Ordering::SeqCst), 1);

    let contents = capture.contents();
    for i in 0..5 {
        assert_eq!(contents.matches(&format!("message {i}\n")).count(), 1);
    }
    assert!(contents.contains("total 60/60"));
    Ok(())
}
