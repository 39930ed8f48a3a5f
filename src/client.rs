use crate::ui::{
    self,
    AppSnapshot,
    TerminalRenderer,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use rand::{
    SeedableRng,
    rngs::StdRng,
};
use slot_reels::{
    MachineConfig,
    ReelId,
    Sequencer,
    SlotMachine,
    SpinEvent,
};
use std::time::Duration;
use tokio::time::{
    self,
    Instant,
    MissedTickBehavior,
};
use tracing::{
    info,
    warn,
};

const FRAME_INTERVAL: Duration = Duration::from_millis(33);

pub struct AppController {
    machine: SlotMachine<TerminalRenderer>,
    reel_ids: Vec<ReelId>,
    status: String,
}

impl AppController {
    pub fn new(config: &MachineConfig) -> Result<Self> {
        let settings = config.sequencer_settings()?;
        let renderer = TerminalRenderer::new(settings.reel_ids.iter());
        let reel_ids = settings.reel_ids.to_vec();
        let mut reel_rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let outcome_rng = StdRng::from_rng(&mut reel_rng);
        let sequencer = Sequencer::new(renderer, settings, reel_rng)
            .wrap_err("setting up reels")?;
        let machine = SlotMachine::new(sequencer, config.policy(), outcome_rng);
        Ok(Self {
            machine,
            reel_ids,
            status: String::from("Press space to spin"),
        })
    }

    pub fn spin(&mut self) {
        match self.machine.pull() {
            Some(pull) => {
                self.status = format!("Spin {} under way", pull.number);
            }
            None => {
                self.status = String::from("Reels still spinning");
            }
        }
    }

    pub fn on_spin_event(&mut self, event: SpinEvent) {
        match event {
            SpinEvent::ReelStarted { .. } | SpinEvent::ReelSettled { .. } => {}
            SpinEvent::SpinCompleted { number } => {
                self.status = format!("Spin {number} done. Press space to spin again");
            }
        }
    }

    pub async fn next_spin_event(&mut self) -> SpinEvent {
        self.machine.sequencer_mut().next_event().await
    }

    /// Advance the reel animations to the current frame.
    pub fn tick(&mut self) {
        self.machine
            .sequencer_mut()
            .renderer_mut()
            .tick(Instant::now());
    }

    pub fn renderer(&self) -> &TerminalRenderer {
        self.machine.sequencer().renderer()
    }

    pub fn reel_ids(&self) -> &[ReelId] {
        &self.reel_ids
    }

    pub fn snapshot(&self) -> AppSnapshot {
        let sequencer = self.machine.sequencer();
        AppSnapshot {
            spin_number: sequencer.spins_started(),
            last_outcome: self
                .machine
                .last_pull()
                .map(|pull| (pull.outcome.to_string(), pull.outcome.match_kind())),
            reels_in_motion: sequencer.reels_in_motion(),
            forced_on_spin: self.machine.policy().forced_outcome().map(|f| f.on_spin),
            status: self.status.clone(),
        }
    }
}

pub async fn run_app(config: MachineConfig) -> Result<()> {
    let mut controller = AppController::new(&config)?;
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    info!("starting UI");
    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(&mut controller, &mut ui_state, &mut input_events).await;
    ui::terminal_exit()?;
    res
}

async fn run_loop(
    controller: &mut AppController,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
) -> Result<()> {
    let mut frames = time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => { break; }
            _ = frames.tick() => {
                controller.tick();
                ui::draw(ui_state, controller.renderer(), controller.reel_ids(), &controller.snapshot())
                    .wrap_err("draw on frame tick failed")?;
            }
            event = controller.next_spin_event() => {
                controller.on_spin_event(event);
            }
            raw = input_events.recv() => {
                let Some(raw) = raw else {
                    warn!("terminal input closed");
                    break;
                };
                let Some(ev) = ui::interpret_event(ui_state, raw) else {
                    continue;
                };
                match ev {
                    ui::UserEvent::Quit => break,
                    ui::UserEvent::Spin => controller.spin(),
                    ui::UserEvent::Redraw => {}
                }
                ui::draw(ui_state, controller.renderer(), controller.reel_ids(), &controller.snapshot())
                    .wrap_err("draw after input failed")?;
            }
        }
    }
    info!("leaving UI");
    Ok(())
}
