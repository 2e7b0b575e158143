//! The graphics collaborator contract and a recording implementation

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use crate::eval::LocalBoxFuture;

/// Outcome of a turtle command: done already, or finishing later.
pub enum Motion {
    /// The command completed synchronously
    Ready,

    /// The command completes when the future does (e.g. an animation)
    Pending(LocalBoxFuture<'static, ()>),
}

impl Motion {
    /// Wrap a future.
    pub fn pending(future: impl Future<Output = ()> + 'static) -> Self {
        Motion::Pending(Box::pin(future))
    }

    /// Wait for the command to finish.
    pub async fn settle(self) {
        if let Motion::Pending(future) = self {
            future.await;
        }
    }
}

impl fmt::Debug for Motion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Motion::Ready => f.write_str("Ready"),
            Motion::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// What the interpreter needs from a drawing surface.
///
/// Headings are in degrees, clockwise, with 0 pointing up.
pub trait Turtle {
    /// Move along the current heading (negative moves backwards).
    fn move_by(&mut self, distance: f64) -> Motion;

    /// Rotate clockwise (negative turns left).
    fn turn(&mut self, degrees: f64) -> Motion;

    /// Return to the origin, heading 0.
    fn home(&mut self) -> Motion;

    /// Jump to a position.
    fn set_position(&mut self, x: f64, y: f64) -> Motion;

    /// Face an absolute heading.
    fn set_heading(&mut self, degrees: f64) -> Motion;

    /// Start drawing.
    fn pen_down(&mut self) -> Motion;

    /// Stop drawing.
    fn pen_up(&mut self) -> Motion;

    /// Change pen colour (`#rrggbb` or a colour name).
    fn set_pen_color(&mut self, color: &str) -> Motion;

    /// Change pen width.
    fn set_pen_width(&mut self, width: f64) -> Motion;

    /// Clear the drawing and reset the turtle.
    fn clear(&mut self) -> Motion;

    /// Current position.
    fn position(&self) -> (f64, f64);

    /// Current heading.
    fn heading(&self) -> f64;
}

/// A command as seen by [`RecordingTurtle`].
#[derive(Debug, Clone, PartialEq)]
pub enum TurtleCommand {
    /// `move_by`
    Move(f64),
    /// `turn`
    Turn(f64),
    /// `home`
    Home,
    /// `set_position`
    SetPosition(f64, f64),
    /// `set_heading`
    SetHeading(f64),
    /// `pen_down`
    PenDown,
    /// `pen_up`
    PenUp,
    /// `set_pen_color`
    PenColor(String),
    /// `set_pen_width`
    PenWidth(f64),
    /// `clear`
    Clear,
}

/// Shared log of commands received by a [`RecordingTurtle`].
pub type TurtleLog = Rc<RefCell<Vec<TurtleCommand>>>;

/// A turtle that tracks its pose and logs every command.
#[derive(Debug, Clone, Default)]
pub struct RecordingTurtle {
    x: f64,
    y: f64,
    heading: f64,
    pen_down: bool,
    log: TurtleLog,
}

impl RecordingTurtle {
    /// A turtle at the origin, pen down.
    pub fn new() -> Self {
        Self {
            pen_down: true,
            ..Default::default()
        }
    }

    /// Handle to the command log; stays valid after the turtle moves into
    /// an interpreter.
    pub fn log(&self) -> TurtleLog {
        Rc::clone(&self.log)
    }

    /// Whether the pen is down.
    pub fn is_pen_down(&self) -> bool {
        self.pen_down
    }

    fn record(&mut self, command: TurtleCommand) -> Motion {
        self.log.borrow_mut().push(command);
        Motion::Ready
    }
}

impl Turtle for RecordingTurtle {
    fn move_by(&mut self, distance: f64) -> Motion {
        let radians = self.heading.to_radians();
        self.x += distance * radians.sin();
        self.y += distance * radians.cos();
        self.record(TurtleCommand::Move(distance))
    }

    fn turn(&mut self, degrees: f64) -> Motion {
        self.heading = (self.heading + degrees).rem_euclid(360.0);
        self.record(TurtleCommand::Turn(degrees))
    }

    fn home(&mut self) -> Motion {
        self.x = 0.0;
        self.y = 0.0;
        self.heading = 0.0;
        self.record(TurtleCommand::Home)
    }

    fn set_position(&mut self, x: f64, y: f64) -> Motion {
        self.x = x;
        self.y = y;
        self.record(TurtleCommand::SetPosition(x, y))
    }

    fn set_heading(&mut self, degrees: f64) -> Motion {
        self.heading = degrees.rem_euclid(360.0);
        self.record(TurtleCommand::SetHeading(degrees))
    }

    fn pen_down(&mut self) -> Motion {
        self.pen_down = true;
        self.record(TurtleCommand::PenDown)
    }

    fn pen_up(&mut self) -> Motion {
        self.pen_down = false;
        self.record(TurtleCommand::PenUp)
    }

    fn set_pen_color(&mut self, color: &str) -> Motion {
        self.record(TurtleCommand::PenColor(color.to_string()))
    }

    fn set_pen_width(&mut self, width: f64) -> Motion {
        self.record(TurtleCommand::PenWidth(width))
    }

    fn clear(&mut self) -> Motion {
        self.x = 0.0;
        self.y = 0.0;
        self.heading = 0.0;
        self.record(TurtleCommand::Clear)
    }

    fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn heading(&self) -> f64 {
        self.heading
    }
}
