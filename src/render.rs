// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! The render loop: polls the engine for samples, aggregates them into bars
//! and paints them, along with the subdivision overlay, onto a surface.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{broadcast, mpsc},
    task::{JoinError, JoinHandle},
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, span, warn, Instrument, Level};

use crate::{
    aggregator::SampleAggregator,
    config::{Change, ConfigError, ConfigStore, Key, Settings},
    engine::{Command, Engine, LogEvent},
    playsync::CancelHandle,
};

mod buffer;
mod canvas;
pub mod painter;

pub use buffer::SampleBuffer;
pub use canvas::{PixelCanvas, Rgb, Surface};

/// The shortest frame or poll interval the loop will run at.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// How often the loop draws and polls, and how much it buffers in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub frame_interval: Duration,
    pub poll_interval: Duration,
    pub sample_buffer_capacity: usize,
}

impl Timing {
    pub fn from_settings(settings: &Settings) -> Result<Timing, ConfigError> {
        Ok(Timing {
            frame_interval: settings.frame_interval()?,
            poll_interval: settings.poll_interval()?,
            sample_buffer_capacity: settings.sample_buffer_capacity(),
        })
    }
}

/// Input from the user interface while the loop is running.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Text typed into the widget for a key.
    Set { key: Key, text: String },
    /// The window was resized.
    Resize { width: u32, height: u32 },
    ResetBeat,
    LoadAudioFile(String),
}

/// Counters kept across mounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames: u64,
    pub polls: u64,
    pub samples: u64,
    pub bars: u64,
    pub dropped: u64,
    pub engine_errors: u64,
    pub rejected_changes: u64,
    pub log_events: u64,
}

/// An idle render loop. Owns everything it draws with, so while it runs no
/// state is shared with anything else.
pub struct RenderLoop<S: Surface> {
    store: ConfigStore,
    engine: Arc<dyn Engine>,
    outbox: mpsc::UnboundedReceiver<Command>,
    surface: S,
    timing: Timing,
    aggregator: SampleAggregator,
    pending: SampleBuffer,
    stats: RenderStats,
}

/// A running render loop.
pub struct RenderHandle<S: Surface> {
    cancel: CancelHandle,
    commands: mpsc::UnboundedSender<RenderCommand>,
    task: JoinHandle<RenderLoop<S>>,
}

impl<S: Surface + Send + 'static> RenderLoop<S> {
    /// Creates an idle loop. `outbox` must be the receiving end of the
    /// store's outbox.
    pub fn new(
        store: ConfigStore,
        engine: Arc<dyn Engine>,
        outbox: mpsc::UnboundedReceiver<Command>,
        surface: S,
        timing: Timing,
    ) -> RenderLoop<S> {
        let display = &store.config().display;
        let aggregator = SampleAggregator::new(store.layout().clone(), display.visual_gain);
        let mut render_loop = RenderLoop {
            pending: SampleBuffer::new(timing.sample_buffer_capacity),
            store,
            engine,
            outbox,
            surface,
            timing,
            aggregator,
            stats: RenderStats::default(),
        };
        render_loop.repaint();
        render_loop
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Starts drawing. The first frame and the first poll happen right away.
    pub fn mount(self) -> RenderHandle<S> {
        let cancel = CancelHandle::new();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let span = span!(Level::INFO, "render loop");
        let task = tokio::spawn(self.run(cancel.clone(), commands_rx).instrument(span));

        RenderHandle {
            cancel,
            commands: commands_tx,
            task,
        }
    }

    async fn run(
        mut self,
        cancel: CancelHandle,
        mut commands: mpsc::UnboundedReceiver<RenderCommand>,
    ) -> RenderLoop<S> {
        let mut frame_tick = time::interval(self.timing.frame_interval.max(MIN_INTERVAL));
        frame_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut poll_tick = time::interval(self.timing.poll_interval.max(MIN_INTERVAL));
        poll_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut logs = Some(self.engine.subscribe_logs());

        info!(
            engine = self.engine.to_string(),
            frame_interval = format!("{:?}", self.timing.frame_interval),
            poll_interval = format!("{:?}", self.timing.poll_interval),
            "Render loop mounted."
        );

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                Some(command) = commands.recv() => self.handle(command),
                Some(command) = self.outbox.recv() => self.deliver(command),
                _ = poll_tick.tick() => self.poll(),
                _ = frame_tick.tick() => self.frame(),
                result = next_log(&mut logs) => match result {
                    Ok(event) => {
                        self.stats.log_events += 1;
                        info!(log = event.message.join("\n"), "Engine log.");
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Missed engine log events.");
                    }
                    Err(broadcast::error::RecvError::Closed) => logs = None,
                },
            }
        }

        // Whatever was queued before the cancel still goes out.
        while let Ok(command) = commands.try_recv() {
            self.handle(command);
        }
        while let Ok(command) = self.outbox.try_recv() {
            self.deliver(command);
        }

        info!(
            frames = self.stats.frames,
            polls = self.stats.polls,
            "Render loop unmounted."
        );
        self
    }

    /// Draws one frame: drain, ingest, paint bars, repaint the overlay.
    fn frame(&mut self) {
        self.stats.frames += 1;

        let samples = self.pending.drain();
        let display = &self.store.config().display;
        self.aggregator.set_visual_gain(display.visual_gain);
        let commands = self.aggregator.ingest(&samples);

        let layout = self.aggregator.layout();
        for command in &commands {
            painter::paint_bar(&mut self.surface, layout, command, display.bar_color_mode);
        }
        painter::paint_overlay(
            &mut self.surface,
            layout,
            display.visual_subdivisions.compiled(),
            display.subdivision_offset,
        );

        self.stats.samples += samples.len() as u64;
        self.stats.bars += commands.len() as u64;
    }

    fn poll(&mut self) {
        match self.engine.get_samples() {
            Ok(samples) => {
                self.stats.polls += 1;
                let dropped = self.pending.push_batch(samples);
                if dropped > 0 {
                    self.stats.dropped += dropped as u64;
                    warn!(
                        dropped,
                        capacity = self.pending.capacity(),
                        "Sample buffer full, dropped oldest samples."
                    );
                }
            }
            Err(e) => {
                self.stats.engine_errors += 1;
                warn!(err = e.to_string(), "Unable to poll engine for samples.");
            }
        }
    }

    fn handle(&mut self, command: RenderCommand) {
        let overlay_key = matches!(
            command,
            RenderCommand::Set {
                key: Key::VisualSubdivisions | Key::SubdivisionOffset,
                ..
            }
        );
        let result = match command {
            RenderCommand::Set { key, text } => self.store.set_text(key, &text),
            RenderCommand::Resize { width, height } => self.store.resize(width, height),
            RenderCommand::ResetBeat => {
                self.store.send(Command::ResetBeat);
                Ok(Change::Pushed)
            }
            RenderCommand::LoadAudioFile(filename) => {
                self.store.send(Command::SetMp3Buffer(filename));
                Ok(Change::Pushed)
            }
        };

        match result {
            Ok(Change::Geometry) => {
                self.aggregator.set_layout(self.store.layout().clone());
                self.repaint();
            }
            // Lines of the old overlay are only erased by a repaint.
            Ok(Change::Local) if overlay_key => self.repaint(),
            Ok(_) => {}
            Err(e) => {
                self.stats.rejected_changes += 1;
                debug!(err = e.to_string(), "Config change refused.");
            }
        }
    }

    fn deliver(&mut self, command: Command) {
        if let Err(e) = command.dispatch(self.engine.as_ref()) {
            self.stats.engine_errors += 1;
            warn!(
                command = command.name(),
                err = e.to_string(),
                "Engine call failed."
            );
        }
    }

    /// Resizes the surface to the layout and repaints the background.
    fn repaint(&mut self) {
        let layout = self.aggregator.layout();
        self.surface.resize(layout.width(), layout.height());
        painter::paint_background(&mut self.surface, layout);
    }
}

impl<S: Surface> RenderHandle<S> {
    /// Queues a command for the loop. Returns false if the loop has exited.
    pub fn send(&self, command: RenderCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Stops the loop and returns it idle, with its surface and counters.
    pub async fn unmount(self) -> Result<RenderLoop<S>, JoinError> {
        self.cancel.cancel();
        self.task.await
    }
}

/// Receives the next engine log event, or waits forever once the channel is
/// gone.
async fn next_log(
    logs: &mut Option<broadcast::Receiver<LogEvent>>,
) -> Result<LogEvent, broadcast::error::RecvError> {
    match logs {
        Some(logs) => logs.recv().await,
        None => std::future::pending().await,
    }
}
