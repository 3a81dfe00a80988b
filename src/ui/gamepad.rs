/// Gamepad input through gilrs.
///
/// Movement comes from the d-pad or the left stick and is read as a held
/// direction, so keeping it pressed walks one cell per turn. The three
/// meta actions are edge-triggered and mapped from `[gamepad]` in
/// config.toml:
///   pause    (default Start)
///   restart  (default A, Start; only acted on after game over)
///   cancel   (default Select; quits)
///
/// Without the `gamepad` feature every query answers "nothing pressed".

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use scavenger::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Face and shoulder buttons that can be bound to an action.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

fn parse_buttons(names: &[String], fallback: &[Btn]) -> Vec<Btn> {
    let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
    if parsed.is_empty() { fallback.to_vec() } else { parsed }
}

/// Up, down, left, right.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
#[derive(Clone, Copy, Default)]
struct Dpad {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    held: Vec<Btn>,
    just_pressed: Vec<Btn>,
    dpad: Dpad,
    stick: (f32, f32),

    pause: Vec<Btn>,
    restart: Vec<Btn>,
    cancel: Vec<Btn>,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(_) => (None, false),
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            held: Vec::with_capacity(4),
            just_pressed: Vec::with_capacity(4),
            dpad: Dpad::default(),
            stick: (0.0, 0.0),
            pause: vec![Btn::Start],
            restart: vec![Btn::A, Btn::Start],
            cancel: vec![Btn::Select],
            connected,
        }
    }

    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.pause = parse_buttons(&cfg.pause, &self.pause);
        self.restart = parse_buttons(&cfg.restart, &self.restart);
        self.cancel = parse_buttons(&cfg.cancel, &self.cancel);
    }

    /// Poll pending gamepad events. Call once per frame.
    pub fn update(&mut self) {
        self.just_pressed.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = &mut self.gilrs else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, v, _) => self.stick.0 = v,
                EventType::AxisChanged(Axis::LeftStickY, v, _) => self.stick.1 = v,
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.held.clear();
                    self.dpad = Dpad::default();
                    self.stick = (0.0, 0.0);
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, down: bool) {
        match btn {
            Button::DPadUp => self.dpad.up = down,
            Button::DPadDown => self.dpad.down = down,
            Button::DPadLeft => self.dpad.left = down,
            Button::DPadRight => self.dpad.right = down,
            other => {
                let Some(b) = Btn::from_gilrs(other) else { return };
                if down {
                    if !self.held.contains(&b) {
                        self.held.push(b);
                        self.just_pressed.push(b);
                    }
                } else {
                    self.held.retain(|h| *h != b);
                }
            }
        }
    }

    // ── Action queries ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|b| self.just_pressed.contains(b))
    }

    pub fn pause_pressed(&self) -> bool {
        self.any_just_pressed(&self.pause)
    }

    pub fn restart_pressed(&self) -> bool {
        self.any_just_pressed(&self.restart)
    }

    pub fn cancel_pressed(&self) -> bool {
        self.any_just_pressed(&self.cancel)
    }

    /// Held direction as a step vector (y-up). Horizontal wins over vertical.
    pub fn direction(&self) -> Option<(i32, i32)> {
        let (sx, sy) = self.stick;
        let right = self.dpad.right || sx > STICK_DEADZONE;
        let left = self.dpad.left || sx < -STICK_DEADZONE;
        let up = self.dpad.up || sy > STICK_DEADZONE;
        let down = self.dpad.down || sy < -STICK_DEADZONE;

        let dx = right as i32 - left as i32;
        let dy = up as i32 - down as i32;
        match (dx, dy) {
            (0, 0) => None,
            (0, dy) => Some((0, dy)),
            (dx, _) => Some((dx, 0)),
        }
    }
}
