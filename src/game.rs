use std::{io, thread::sleep, time::{Duration, Instant}};

use crate::config::Settings;
use crate::input::{direction_for, is_escape, is_quit, is_replay, InputEvent, InputSource};
use crate::render::{self, Anchor, Point, Renderer};
use crate::round::{RoundSimulator, RoundState};
use crate::snake::Direction;

use log::info;
use rand::Rng;

pub const TITLE: &str = "Wormy!";
const TITLE_SPIN_SLOW: u32 = 3;
const TITLE_SPIN_FAST: u32 = 7;

/// Waits out the rest of a frame.
pub trait Pacer {
    fn tick(&mut self, fps: u32);
}

/// Sleeps so that successive ticks are `1 / fps` seconds apart.
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        FrameClock { last: Instant::now() }
    }
}

impl Pacer for FrameClock {
    fn tick(&mut self, fps: u32) {
        let frame = Duration::from_secs(1) / fps.max(1);
        let elapsed = self.last.elapsed();
        if elapsed < frame {
            sleep(frame - elapsed);
        }
        self.last = Instant::now();
    }
}

/// Two title labels spinning at different speeds on the start screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TitleAnimation {
    degrees: [u32; 2],
}

impl TitleAnimation {
    pub fn advance(&mut self) {
        self.degrees[0] = (self.degrees[0] + TITLE_SPIN_SLOW) % 360;
        self.degrees[1] = (self.degrees[1] + TITLE_SPIN_FAST) % 360;
    }

    #[cfg(test)]
    pub fn degrees(&self) -> [u32; 2] {
        self.degrees
    }

    /// A terminal cannot rotate text, so each label circles the center
    /// instead, at its own angle.
    pub fn label_points(&self, center: Point, radius: Point) -> [Point; 2] {
        self.degrees.map(|deg| {
            let rad = (deg as f64).to_radians();
            Point::new(
                center.x + (radius.x as f64 * rad.cos()).round() as i32,
                center.y - (radius.y as f64 * rad.sin()).round() as i32,
            )
        })
    }
}

pub enum Screen {
    Start(TitleAnimation),
    Playing(RoundSimulator),
    GameOver { score: usize, drawn: bool },
    Terminated,
}

impl Screen {
    fn name(&self) -> &'static str {
        match self {
            Screen::Start(_) => "start",
            Screen::Playing(_) => "playing",
            Screen::GameOver { .. } => "game over",
            Screen::Terminated => "terminated",
        }
    }
}

/// Last direction press in `events` that does not reverse `current`.
pub fn fold_direction(current: Direction, events: &[InputEvent]) -> Option<Direction> {
    events
        .iter()
        .filter_map(|ev| ev.pressed().and_then(direction_for))
        .filter(|dir| *dir != current.opposite())
        .last()
}

fn closes_game(ev: &InputEvent) -> bool {
    match ev {
        InputEvent::Close => true,
        _ => ev.pressed().map_or(false, is_escape),
    }
}

pub struct SessionController<R, I, P, G> {
    settings: Settings,
    renderer: R,
    input: I,
    pacer: P,
    rng: G,
    screen: Screen,
    rounds: u32,
}

impl<R: Renderer, I: InputSource, P: Pacer, G: Rng> SessionController<R, I, P, G> {
    pub fn new(settings: Settings, renderer: R, input: I, pacer: P, rng: G) -> Self {
        SessionController {
            settings,
            renderer,
            input,
            pacer,
            rng,
            screen: Screen::Start(TitleAnimation::default()),
            rounds: 0,
        }
    }

    /// Runs frames until the player quits.
    pub fn run(&mut self) -> io::Result<()> {
        while !self.is_terminated() {
            self.step()?;
        }
        info!("Session over after {} rounds", self.rounds);
        Ok(())
    }

    /// One frame of whichever screen is showing.
    pub fn step(&mut self) -> io::Result<()> {
        let events = self.input.snapshot()?;

        match self.screen {
            Screen::Start(_) => self.start_frame(&events),
            Screen::Playing(_) => self.play_frame(&events),
            Screen::GameOver { .. } => self.game_over_frame(&events),
            Screen::Terminated => Ok(()),
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.screen, Screen::Terminated)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn start_frame(&mut self, events: &[InputEvent]) -> io::Result<()> {
        for ev in events {
            if closes_game(ev) {
                self.switch(Screen::Terminated);
                return Ok(());
            }
            if ev.pressed().is_some() {
                self.start_round();
                return Ok(());
            }
        }

        let title = match &self.screen {
            Screen::Start(title) => title.clone(),
            _ => return Ok(()),
        };
        self.draw_start(&title)?;
        self.pacer.tick(self.settings.start_fps);

        if let Screen::Start(title) = &mut self.screen {
            title.advance();
        }
        Ok(())
    }

    fn play_frame(&mut self, events: &[InputEvent]) -> io::Result<()> {
        if events.iter().any(closes_game) {
            self.switch(Screen::Terminated);
            return Ok(());
        }

        let sim = match &mut self.screen {
            Screen::Playing(sim) => sim,
            _ => return Ok(()),
        };

        let turn = fold_direction(sim.direction(), events);
        if sim.tick(turn, &mut self.rng) == RoundState::Over {
            let score = sim.score();
            info!("Round {} ended by {:?} after {} ticks, score {}", self.rounds, sim.end_cause(), sim.ticks(), score);
            self.switch(Screen::GameOver { score, drawn: false });
            return Ok(());
        }

        self.draw_round()?;
        self.pacer.tick(self.settings.fps);
        Ok(())
    }

    fn game_over_frame(&mut self, events: &[InputEvent]) -> io::Result<()> {
        if let Screen::GameOver { score, drawn: false } = self.screen {
            self.draw_game_over(score)?;
            self.screen = Screen::GameOver { score, drawn: true };
        }

        for ev in events {
            let quit = match (ev, ev.released()) {
                (InputEvent::Close, _) => true,
                (_, Some(code)) if is_quit(code) => true,
                (_, Some(code)) if is_replay(code) => {
                    self.start_round();
                    return Ok(());
                }
                _ => false,
            };
            if quit {
                self.switch(Screen::Terminated);
                return Ok(());
            }
        }

        self.pacer.tick(self.settings.start_fps);
        Ok(())
    }

    fn start_round(&mut self) {
        let sim = RoundSimulator::new(self.settings.grid, &mut self.rng);
        self.rounds += 1;
        self.switch(Screen::Playing(sim));
    }

    fn switch(&mut self, next: Screen) {
        info!("Screen {} -> {}", self.screen.name(), next.name());
        self.screen = next;
    }

    fn draw_start(&mut self, title: &TitleAnimation) -> io::Result<()> {
        let (w, h) = (self.settings.window_width as i32, self.settings.window_height as i32);
        let center = Point::new(w / 2, h / 2);
        let [slow, fast] = title.label_points(center, Point::new(w / 4, h / 4));

        self.renderer.clear(render::BG_COLOR)?;
        self.renderer.draw_text(TITLE, slow, Anchor::Center, render::DARK_GREEN)?;
        self.renderer.draw_text(TITLE, fast, Anchor::Center, render::GREEN)?;
        self.renderer.draw_text("Press a key to play.", Point::new(w - 200, h - 30), Anchor::TopLeft, render::TEXT_COLOR)?;
        self.renderer.present()
    }

    fn draw_round(&mut self) -> io::Result<()> {
        let sim = match &self.screen {
            Screen::Playing(sim) => sim,
            _ => return Ok(()),
        };
        let cell = self.settings.cell_size;
        let score = format!("Score: {}", sim.score());

        self.renderer.clear(render::BG_COLOR)?;
        self.renderer.draw_grid_lines(cell, render::GRID_COLOR)?;
        self.renderer.draw_worm_segments(sim.worm().body(), cell, render::WORM_OUTER, render::WORM_INNER)?;
        self.renderer.draw_apple(sim.apple(), cell, render::APPLE_COLOR)?;
        self.renderer.draw_text(&score, Point::new(self.settings.window_width as i32 - 120, 10), Anchor::TopLeft, render::TEXT_COLOR)?;
        self.renderer.present()
    }

    fn draw_game_over(&mut self, score: usize) -> io::Result<()> {
        let mid = self.settings.window_width as i32 / 2;
        let line = self.settings.cell_size as i32;

        self.renderer.clear(render::BG_COLOR)?;
        self.renderer.draw_text("Game", Point::new(mid, 10), Anchor::MidTop, render::RED)?;
        self.renderer.draw_text("Over", Point::new(mid, 10 + 3 * line), Anchor::MidTop, render::RED)?;
        self.renderer.draw_text(&format!("Score: {}", score), Point::new(mid, 10 + 6 * line), Anchor::MidTop, render::TEXT_COLOR)?;
        self.renderer.draw_text(
            "Press R to play again   |   Q to quit",
            Point::new(mid, 10 + 8 * line),
            Anchor::MidTop,
            render::TEXT_COLOR,
        )?;
        self.renderer.present()
    }
}
