use super::*;

/// Every character advances `advance` px; lines are `height` px tall.
struct FixedAdvance {
    advance: f32,
    height: f32,
    calls: usize,
}

impl FixedAdvance {
    fn new(advance: f32) -> Self {
        Self {
            advance,
            height: 10.0,
            calls: 0,
        }
    }
}

impl TextMeasure for FixedAdvance {
    fn measure_line(&mut self, text: &str) -> (f32, f32) {
        self.calls += 1;
        (text.chars().count() as f32 * self.advance, self.height)
    }
}

fn texts(lines: &[Line]) -> Vec<&str> {
    lines.iter().map(|l| l.text.as_str()).collect()
}

#[test]
fn greedy_wrap_fills_lines_up_to_budget() {
    let mut m = FixedAdvance::new(10.0);
    let lines = layout("MAX VERSTAPPEN WINS AGAIN", &mut m, 150.0);
    assert_eq!(texts(&lines), vec!["MAX VERSTAPPEN", "WINS AGAIN"]);
    assert_eq!(lines[0].width, 140.0);
    assert_eq!(lines[1].width, 100.0);
}

#[test]
fn exact_fit_stays_on_line() {
    let mut m = FixedAdvance::new(10.0);
    let lines = layout("ab cd", &mut m, 50.0);
    assert_eq!(texts(&lines), vec!["ab cd"]);
}

#[test]
fn overlong_word_sits_alone_without_empty_lines() {
    let mut m = FixedAdvance::new(10.0);
    let lines = layout("SUPERCALIFRAGILISTIC is long", &mut m, 80.0);
    assert_eq!(texts(&lines), vec!["SUPERCALIFRAGILISTIC", "is long"]);
    assert!(lines[0].width > 80.0);

    let lines = layout("a SUPERCALIFRAGILISTIC b", &mut m, 80.0);
    assert_eq!(texts(&lines), vec!["a", "SUPERCALIFRAGILISTIC", "b"]);
}

#[test]
fn lines_respect_width_unless_single_word() {
    let text = "the quick brown fox jumps over the lazy dog while a racing car \
                screams past the grandstand at three hundred kilometres per hour";
    for width in [15.0f32, 40.0, 73.0, 120.0, 333.0, 1000.0] {
        let mut m = FixedAdvance::new(7.0);
        for line in layout(text, &mut m, width) {
            let single_word = !line.text.contains(' ');
            assert!(
                line.width <= width || single_word,
                "line '{}' ({}) exceeds {width}",
                line.text,
                line.width
            );
        }
    }
}

#[test]
fn wrapping_preserves_words_in_order() {
    let text = "  Hamilton\tjoins   Ferrari\nfor 2025  ";
    let mut m = FixedAdvance::new(9.0);
    let lines = layout(text, &mut m, 90.0);
    let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.text.split(' ')).collect();
    assert_eq!(rejoined, vec!["Hamilton", "joins", "Ferrari", "for", "2025"]);
}

#[test]
fn empty_and_blank_text_produce_no_lines() {
    let mut m = FixedAdvance::new(10.0);
    assert!(layout("", &mut m, 100.0).is_empty());
    assert!(layout("   \n ", &mut m, 100.0).is_empty());
    assert_eq!(measure("", &mut m, 100.0, 15.0), (0.0, 0.0));
}

#[test]
fn measure_adds_spacing_per_line() {
    let mut m = FixedAdvance::new(10.0);
    let (w, h) = measure("MAX VERSTAPPEN WINS AGAIN", &mut m, 150.0, 15.0);
    assert_eq!(w, 140.0);
    assert_eq!(h, 2.0 * (10.0 + 15.0));
}

#[test]
fn layout_is_deterministic() {
    let text = "Piastri takes maiden victory after late safety car drama in Hungary";
    let mut a = FixedAdvance::new(11.0);
    let mut b = FixedAdvance::new(11.0);
    assert_eq!(layout(text, &mut a, 200.0), layout(text, &mut b, 200.0));
    assert_eq!(a.calls, b.calls);
}

#[test]
fn line_x_centers_or_uses_margin() {
    let line = Line {
        text: "X".to_string(),
        width: 100.0,
        height: 10.0,
    };
    assert_eq!(line_x(&line, Align::Center, 1080.0, 50.0), 490.0);
    assert_eq!(line_x(&line, Align::Left, 1080.0, 50.0), 50.0);
}
