use rand::Rng;

use crate::services::slots::payouts::Reel;

/// The visible 3x3 window after a pull; the center row is the pay line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spin {
    pub rows: [[Reel; 3]; 3],
}

/// Spin three reels: each reel is the symbol wheel rotated to a random
/// position, showing three consecutive symbols.
pub fn spin<R: Rng>(rng: &mut R) -> Spin {
    let wheel = Reel::ALL;
    let mut columns = [[Reel::Cherries; 3]; 3];

    for column in &mut columns {
        let offset = rng.gen_range(0..wheel.len());
        for (row, slot) in column.iter_mut().enumerate() {
            *slot = wheel[(offset + row) % wheel.len()];
        }
    }

    Spin {
        rows: [
            [columns[0][0], columns[1][0], columns[2][0]],
            [columns[0][1], columns[1][1], columns[2][1]],
            [columns[0][2], columns[1][2], columns[2][2]],
        ],
    }
}

impl Spin {
    pub fn pay_line(&self) -> [Reel; 3] {
        self.rows[1]
    }

    /// Render the window with a `>` marker on the pay line. The leading
    /// `~~\n~~` keeps Discord's mobile client from mangling the layout.
    pub fn render(&self) -> String {
        let mut out = String::from("~~\n~~");
        for (i, row) in self.rows.iter().enumerate() {
            let sign = if i == 1 { ">" } else { "  " };
            out.push_str(&format!("{}{} {} {}\n", sign, row[0], row[1], row[2]));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_columns_are_consecutive_wheel_symbols() {
        let mut rng = StdRng::seed_from_u64(42);
        let spin = spin(&mut rng);

        for column in 0..3 {
            let top = Reel::ALL
                .iter()
                .position(|r| *r == spin.rows[0][column])
                .unwrap();
            assert_eq!(spin.rows[1][column], Reel::ALL[(top + 1) % Reel::ALL.len()]);
            assert_eq!(spin.rows[2][column], Reel::ALL[(top + 2) % Reel::ALL.len()]);
        }
    }

    #[test]
    fn test_seeded_spin_is_deterministic() {
        let first = spin(&mut StdRng::seed_from_u64(7));
        let second = spin(&mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_marks_the_pay_line() {
        let spin = spin(&mut StdRng::seed_from_u64(7));
        let rendered = spin.render();

        // First visible row shares the line with the mobile-friendly "~~".
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "~~");
        assert!(lines[1].starts_with("~~  "));
        assert!(lines[2].starts_with('>'));
        assert!(lines[3].starts_with("  "));
    }
}
