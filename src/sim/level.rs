/// Level data: platforms, traps and the oracle.
///
/// Platforms are stored in one ordered list. The first `visible_count`
/// are always drawn; the rest are hidden and only drawn in vision mode.
/// All of them are solid, hidden or not, and collision walks them in
/// this order.
///
/// Nothing here changes after construction. Traps are drawn but have no
/// gameplay effect.

use crate::domain::rect::Rect;

pub struct Level {
    platforms: Vec<Rect>,
    visible_count: usize,
    traps: Vec<Rect>,
    goal: Rect,
}

impl Level {
    pub fn new(visible: Vec<Rect>, hidden: Vec<Rect>, traps: Vec<Rect>, goal: Rect) -> Self {
        let visible_count = visible.len();
        let mut platforms = visible;
        platforms.extend(hidden);
        Level { platforms, visible_count, traps, goal }
    }

    /// The single built-in layout.
    pub fn builtin() -> Self {
        Level::new(
            vec![
                // Ground
                Rect::new(0.0, 500.0, 300.0, 20.0),
                Rect::new(350.0, 500.0, 200.0, 20.0),
                Rect::new(600.0, 500.0, 200.0, 20.0),
                // Raised steps
                Rect::new(200.0, 400.0, 100.0, 20.0),
                Rect::new(400.0, 350.0, 100.0, 20.0),
                // Oracle ledge
                Rect::new(600.0, 300.0, 150.0, 20.0),
            ],
            vec![
                Rect::new(300.0, 200.0, 80.0, 15.0),
                Rect::new(500.0, 250.0, 80.0, 15.0),
            ],
            vec![
                Rect::new(320.0, 480.0, 30.0, 20.0),
                Rect::new(550.0, 480.0, 30.0, 20.0),
            ],
            Rect::new(700.0, 300.0, 50.0, 50.0),
        )
    }

    /// Every platform, visible first, in collision order.
    pub fn platforms(&self) -> &[Rect] {
        &self.platforms
    }

    pub fn visible_platforms(&self) -> &[Rect] {
        &self.platforms[..self.visible_count]
    }

    pub fn hidden_platforms(&self) -> &[Rect] {
        &self.platforms[self.visible_count..]
    }

    pub fn traps(&self) -> &[Rect] {
        &self.traps
    }

    pub fn goal(&self) -> Rect {
        self.goal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_partition() {
        let level = Level::builtin();
        assert_eq!(level.platforms().len(), 8);
        assert_eq!(level.visible_platforms().len(), 6);
        assert_eq!(level.hidden_platforms().len(), 2);
        assert_eq!(level.hidden_platforms()[0], Rect::new(300.0, 200.0, 80.0, 15.0));
        assert_eq!(level.traps().len(), 2);
        assert_eq!(level.goal(), Rect::new(700.0, 300.0, 50.0, 50.0));
    }

    #[test]
    fn partition_is_prefix_suffix() {
        let level = Level::builtin();
        let joined: Vec<Rect> = level
            .visible_platforms()
            .iter()
            .chain(level.hidden_platforms())
            .copied()
            .collect();
        assert_eq!(joined, level.platforms());
    }

    #[test]
    fn empty_hidden_set() {
        let level = Level::new(
            vec![Rect::new(0.0, 0.0, 1.0, 1.0)],
            vec![],
            vec![],
            Rect::new(5.0, 5.0, 1.0, 1.0),
        );
        assert_eq!(level.visible_platforms().len(), 1);
        assert!(level.hidden_platforms().is_empty());
    }

    #[test]
    fn oracle_sits_on_its_ledge() {
        let level = Level::builtin();
        let ledge = level.visible_platforms()[5];
        let goal = level.goal();
        assert!(goal.left() >= ledge.left() && goal.right() <= ledge.right());
        assert!(goal.overlaps(&ledge));
    }
}
