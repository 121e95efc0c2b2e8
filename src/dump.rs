//! Dump raw input events for debugging.
//! Run: mtpad dump /dev/input/eventN  (or a recorded capture file).

use std::fs::File;
use std::io::{self, BufReader, Read};

use crate::input::{code_name, parse_input_event};

pub fn run_dump(path: &str, event_size: usize) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let file = File::open(path)?;
    eprintln!("Dumping events from {} (Ctrl+C to stop):\n", path);

    let stdout = io::stdout();
    let count = dump_events(BufReader::new(file), event_size, &mut stdout.lock())?;
    eprintln!("\n{} events", count);
    Ok(())
}

/// Print one line per event until the source ends; returns the event count.
fn dump_events(
    mut source: impl Read,
    event_size: usize,
    out: &mut impl io::Write,
) -> io::Result<u64> {
    let mut buf = vec![0u8; event_size];
    let mut n = 0u64;
    loop {
        match source.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(n),
            Err(e) => return Err(e),
        }
        if let Some(ev) = parse_input_event(&buf) {
            n += 1;
            let name = code_name(ev.ty, ev.code);
            writeln!(out, "{:6}  {}  {}  value={}", n, ev.time, name, ev.value)?;
            if ev.is_sync() {
                writeln!(out)?;
            }
        }
    }
}
