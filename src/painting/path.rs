use crate::geometry::{Offset, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Offset),
    LineTo(Offset),
    Close,
    Rect(Rect),
    Oval(Rect),
}

/// A sequence of outline commands, used for path clips and fills.
///
/// Containment uses the even-odd rule across all sub-paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, point: Offset) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(point));
        self
    }

    pub fn line_to(&mut self, point: Offset) -> &mut Self {
        self.commands.push(PathCommand::LineTo(point));
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    pub fn add_rect(&mut self, rect: Rect) -> &mut Self {
        self.commands.push(PathCommand::Rect(rect));
        self
    }

    pub fn add_oval(&mut self, rect: Rect) -> &mut Self {
        self.commands.push(PathCommand::Oval(rect));
        self
    }

    /// Closed polygon through `points`.
    pub fn polygon(points: &[Offset]) -> Self {
        let mut path = Path::new();
        if let Some((&first, rest)) = points.split_first() {
            path.move_to(first);
            for &point in rest {
                path.line_to(point);
            }
            path.close();
        }
        path
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The same path moved by `offset`.
    pub fn shift(&self, offset: Offset) -> Path {
        let commands = self
            .commands
            .iter()
            .map(|command| match *command {
                PathCommand::MoveTo(p) => PathCommand::MoveTo(p + offset),
                PathCommand::LineTo(p) => PathCommand::LineTo(p + offset),
                PathCommand::Close => PathCommand::Close,
                PathCommand::Rect(r) => PathCommand::Rect(r.translate(offset)),
                PathCommand::Oval(r) => PathCommand::Oval(r.translate(offset)),
            })
            .collect();
        Path { commands }
    }

    pub fn contains(&self, point: Offset) -> bool {
        let mut inside = false;
        let mut start: Option<Offset> = None;
        let mut current: Option<Offset> = None;

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    if let (Some(s), Some(c)) = (start, current) {
                        inside ^= crosses(c, s, point);
                    }
                    start = Some(p);
                    current = Some(p);
                }
                PathCommand::LineTo(p) => {
                    if let Some(c) = current {
                        inside ^= crosses(c, p, point);
                    } else {
                        start = Some(p);
                    }
                    current = Some(p);
                }
                PathCommand::Close => {
                    if let (Some(s), Some(c)) = (start, current) {
                        inside ^= crosses(c, s, point);
                    }
                    current = start;
                }
                PathCommand::Rect(r) => inside ^= r.contains(point),
                PathCommand::Oval(r) => inside ^= oval_contains(r, point),
            }
        }
        // An open trailing sub-path is implicitly closed
        if let (Some(s), Some(c)) = (start, current) {
            if s != c {
                inside ^= crosses(c, s, point);
            }
        }
        inside
    }
}

/// Whether a horizontal ray from `p` to +x crosses segment `a`→`b`.
fn crosses(a: Offset, b: Offset, p: Offset) -> bool {
    if (a.y > p.y) == (b.y > p.y) {
        return false;
    }
    let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
    p.x < x
}

fn oval_contains(r: Rect, p: Offset) -> bool {
    let rx = r.width / 2.0;
    let ry = r.height / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let dx = (p.x - (r.x + rx)) / rx;
    let dy = (p.y - (r.y + ry)) / ry;
    dx * dx + dy * dy <= 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_contains() {
        let path = Path::polygon(&[
            Offset::new(0.0, 0.0),
            Offset::new(100.0, 0.0),
            Offset::new(0.0, 100.0),
        ]);
        assert!(path.contains(Offset::new(10.0, 10.0)));
        assert!(!path.contains(Offset::new(90.0, 90.0)));
    }

    #[test]
    fn test_oval_and_even_odd() {
        let mut path = Path::new();
        path.add_oval(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(path.contains(Offset::new(50.0, 50.0)));
        assert!(!path.contains(Offset::new(2.0, 2.0)));

        // A rect inside the oval punches a hole
        path.add_rect(Rect::new(40.0, 40.0, 20.0, 20.0));
        assert!(!path.contains(Offset::new(50.0, 50.0)));
        assert!(path.contains(Offset::new(30.0, 50.0)));
    }

    #[test]
    fn test_shift() {
        let mut path = Path::new();
        path.add_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let moved = path.shift(Offset::new(20.0, 0.0));
        assert!(moved.contains(Offset::new(25.0, 5.0)));
        assert!(!moved.contains(Offset::new(5.0, 5.0)));
    }
}
