mod event;
mod ingest;

pub use event::{code_name, parse_input_event, INPUT_EVENT_SIZE_32, INPUT_EVENT_SIZE_64};
pub use ingest::Ingestor;

use std::fs::File;
use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::gesture::{Effects, Recognizer, Timestamp};
use crate::output::{self, Emitter};

use event::RawEvent;

/// Maps input-event time onto the wall clock so timer deadlines can be
/// waited for between events.
struct EventClock {
    anchor: Option<(Timestamp, Instant)>,
}

impl EventClock {
    fn new() -> Self {
        Self { anchor: None }
    }

    fn observe(&mut self, time: Timestamp) {
        self.anchor = Some((time, Instant::now()));
    }

    fn now(&self) -> Option<Timestamp> {
        let (time, at) = self.anchor?;
        Some(time + at.elapsed())
    }

    /// Wall-clock wait until `deadline`, zero if already passed.
    fn wait_for(&self, deadline: Timestamp) -> Duration {
        let Some(now) = self.now() else {
            return Duration::ZERO;
        };
        let micros = deadline.micros_since(now).max(0);
        Duration::from_micros(micros as u64)
    }
}

/// Open the configured device and run the recognizer until the stream ends.
pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let file = File::open(&config.device)?;
    log::info!("Reading touch events from {}", config.device);

    let mut emitter = output::create(config)?;
    let rx = spawn_reader(file, config.event_size);
    let mut ingest = Ingestor::new(Recognizer::new(config.gesture.clone()));

    run_event_loop(&rx, &mut ingest, emitter.as_mut(), config)
}

fn spawn_reader(mut source: impl Read + Send + 'static, event_size: usize) -> Receiver<io::Result<RawEvent>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = vec![0u8; event_size];
        loop {
            match source.read_exact(&mut buf) {
                Ok(()) => {
                    let Some(ev) = parse_input_event(&buf) else {
                        continue;
                    };
                    if tx.send(Ok(ev)).is_err() {
                        return;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return,
                Err(e) => {
                    let _ = tx.send(Err(e));
                    return;
                }
            }
        }
    });
    rx
}

fn run_event_loop(
    rx: &Receiver<io::Result<RawEvent>>,
    ingest: &mut Ingestor,
    emitter: &mut dyn Emitter,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut clock = EventClock::new();

    loop {
        let received = match ingest.next_deadline() {
            Some(deadline) => rx.recv_timeout(clock.wait_for(deadline)),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        let effects: Effects = match received {
            Ok(ev) => {
                let ev = ev?;
                clock.observe(ev.time);
                ingest.feed(&ev)
            }
            Err(RecvTimeoutError::Timeout) => match clock.now() {
                Some(now) => ingest.advance(now),
                None => continue,
            },
            Err(RecvTimeoutError::Disconnected) => {
                log::info!("Touch stream ended");
                let effects = ingest.finish();
                output::dispatch(emitter, &effects, config)?;
                return Ok(());
            }
        };

        output::dispatch(emitter, &effects, config)?;
    }
}
