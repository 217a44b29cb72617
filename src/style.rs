//! Rendering attributes derived from the proof-graph model
//!
//! Everything here is a pure function of a [`StyleConfig`] and model values;
//! nothing is written back onto the model.

use crate::core::*;
use std::collections::BTreeMap;
use std::fmt;

////////////////////////////////////////////////////////////////////////////////
// Configuration

/// Line, highlight and faint colors for one family of edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accent {
    /// Line color of an active edge
    pub line: String,
    /// Label color of an active edge; also its highlight/hover color
    pub strong: String,
    /// Highlight/hover color of an inactive edge
    pub faint: String,
}

impl Accent {
    fn new(line: &str, strong: &str, faint: &str) -> Self {
        Self {
            line: line.to_owned(),
            strong: strong.to_owned(),
            faint: faint.to_owned(),
        }
    }
}

/// Named colors used by both serializers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub outline: String,
    pub inactive_outline: String,
    pub inactive_fill: String,
    pub font: String,
    pub inactive_font: String,
    pub inactive_edge: String,
    pub forward: Accent,
    pub backward: Accent,
    pub candidate: Accent,
    pub unification: Accent,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            outline: "#000000".to_owned(),
            inactive_outline: "#a0a0a0".to_owned(),
            inactive_fill: "whitesmoke".to_owned(),
            font: "black".to_owned(),
            inactive_font: "darkgray".to_owned(),
            inactive_edge: "lightgray".to_owned(),
            forward: Accent::new("dodgerblue", "darkblue", "lightblue"),
            backward: Accent::new("indianred", "darkred", "lightsalmon"),
            candidate: Accent::new("dimgray", "black", "silver"),
            unification: Accent::new("seagreen", "darkgreen", "palegreen"),
        }
    }
}

/// Everything attribute assignment needs, passed explicitly
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    pub palette: Palette,
    /// Lowest value of any color channel
    pub intensity_floor: u8,
    /// Highest value of any color channel
    pub intensity_ceiling: u8,
    /// Hue of depth 0
    pub base_hue: u32,
    /// Hue added per depth level
    pub hue_step: u32,
    /// Hue at which the ramp saturates
    pub hue_ceiling: u32,
    pub font_name: String,
    pub node_font_size: u32,
    pub edge_font_size: u32,
    /// Font size of the interactive view
    pub vis_font_size: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            intensity_floor: 160,
            intensity_ceiling: 255,
            base_hue: 200,
            hue_step: 32,
            hue_ceiling: 360,
            font_name: "Consolas".to_owned(),
            node_font_size: 11,
            edge_font_size: 10,
            vis_font_size: 20,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Colors

/// An RGB color, displayed as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl StyleConfig {
    /// Returns the hue for a depth; unplaced literals count as depth 0
    pub fn hue(&self, depth: Option<u32>) -> u32 {
        let depth = depth.unwrap_or(0);
        self.base_hue
            .saturating_add(depth.saturating_mul(self.hue_step))
            .min(self.hue_ceiling)
    }

    /// Maps a depth to a fill color
    ///
    /// The hue walks through three bands (blue to violet to red); within a
    /// band one channel is interpolated between the intensity floor and
    /// ceiling while the other two are pinned.
    pub fn depth_color(&self, depth: Option<u32>) -> Rgb {
        let h = self.hue(depth) as i64;
        let lo = self.intensity_floor as i64;
        let hi = self.intensity_ceiling as i64;
        let interp = |x: i64| x * (hi - lo) / 60 + lo;

        let (r, g, b) = if h < 240 {
            (lo, interp(240 - h), hi)
        } else if h < 300 {
            (interp(h - 240), lo, hi)
        } else {
            (hi, lo, interp(360 - h))
        };

        let clamp = |c: i64| c.clamp(lo.min(hi), hi.max(lo)) as u8;
        Rgb(clamp(r), clamp(g), clamp(b))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Entity styles

/// Rendering attributes of a literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralStyle {
    /// Depth color when active, neutral fill otherwise
    pub fill: String,
    pub outline: String,
    pub font_color: String,
    /// 2 for observations, 1 otherwise
    pub peripheries: u8,
}

/// Rendering attributes of an edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeStyle {
    pub color: String,
    pub highlight: String,
    pub hover: String,
    pub font_color: String,
}

impl StyleConfig {
    /// Returns the style of a literal
    pub fn literal_style(&self, literal: &Literal) -> LiteralStyle {
        let p = &self.palette;
        let (fill, outline, font_color) = if literal.active {
            (
                self.depth_color(literal.depth).to_string(),
                p.outline.clone(),
                p.font.clone(),
            )
        } else {
            (
                p.inactive_fill.clone(),
                p.inactive_outline.clone(),
                p.inactive_font.clone(),
            )
        };
        LiteralStyle {
            fill,
            outline,
            font_color,
            peripheries: if literal.is_observable() { 2 } else { 1 },
        }
    }

    /// Returns the accent family of a step
    pub fn step_accent(&self, kind: StepKind, step: &Step) -> &Accent {
        match kind {
            StepKind::Candidate => &self.palette.candidate,
            StepKind::Chain if step.backward => &self.palette.backward,
            StepKind::Chain => &self.palette.forward,
        }
    }

    /// Returns the style of the edges a step lowers to
    pub fn step_style(&self, kind: StepKind, step: &Step) -> EdgeStyle {
        self.edge_style(self.step_accent(kind, step), step.active)
    }

    /// Returns the style of a unification edge
    pub fn unification_style(&self, unification: &Unification) -> EdgeStyle {
        self.edge_style(&self.palette.unification, unification.active)
    }

    fn edge_style(&self, accent: &Accent, active: bool) -> EdgeStyle {
        if active {
            EdgeStyle {
                color: accent.line.clone(),
                highlight: accent.strong.clone(),
                hover: accent.strong.clone(),
                font_color: accent.strong.clone(),
            }
        } else {
            EdgeStyle {
                color: self.palette.inactive_edge.clone(),
                highlight: accent.faint.clone(),
                hover: accent.faint.clone(),
                font_color: self.palette.inactive_font.clone(),
            }
        }
    }
}

/// Groups literals by depth for same-rank layout hints
///
/// Unplaced literals belong to no group; groups keep document order.
pub fn rank_groups<'a>(
    literals: impl Iterator<Item = &'a Literal>,
) -> BTreeMap<u32, Vec<LiteralId>> {
    let mut ranks: BTreeMap<u32, Vec<LiteralId>> = BTreeMap::new();
    for literal in literals {
        if let Some(d) = literal.depth {
            ranks.entry(d).or_default().push(literal.id);
        }
    }
    ranks
}

/// Formats a step label, appending the cost when there is one
///
/// `newline` separates axiom and cost; DOT wants the two characters `\n`,
/// the interactive view a real line break.
pub fn step_label(step: &Step, kind: StepKind, newline: &str) -> String {
    match (kind, step.cost) {
        (StepKind::Chain, Some(c)) => format!("{}{}${:.2}", step.axiom, newline, c),
        (StepKind::Candidate, Some(c)) => format!("${:.2}", c),
        (_, None) => step.axiom.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn depth_zero_is_light_blue() {
        let c = StyleConfig::default();
        assert_eq!(c.hue(Some(0)), 200);
        // g = 40 * 95 / 60 + 160
        assert_eq!(c.depth_color(Some(0)), Rgb(160, 223, 255));
        assert_eq!(c.depth_color(Some(0)).to_string(), "#a0dfff");
    }

    #[test]
    fn deep_literals_saturate_at_red() {
        let c = StyleConfig::default();
        assert_eq!(c.hue(Some(5)), 360);
        assert_eq!(c.hue(Some(u32::MAX)), 360);
        assert_eq!(c.depth_color(Some(1000)), Rgb(255, 160, 160));
    }

    #[test]
    fn unplaced_literal_colored_as_depth_zero() {
        let c = StyleConfig::default();
        assert_eq!(c.depth_color(None), c.depth_color(Some(0)));
    }

    #[test]
    fn inactive_literal_is_neutral() {
        let c = StyleConfig::default();
        let mut l = Literal::new(0, Some(3), false, "observable", "p");
        let s = c.literal_style(&l);
        assert_eq!(s.fill, "whitesmoke");
        assert_eq!(s.peripheries, 2);
        l.active = true;
        l.kind = "hypothesis".to_owned();
        let s = c.literal_style(&l);
        assert_eq!(s.fill, c.depth_color(Some(3)).to_string());
        assert_eq!(s.peripheries, 1);
    }

    #[test]
    fn direction_has_distinct_accents() {
        let c = StyleConfig::default();
        let mut step = Step {
            id: 0,
            tail: vec![0],
            head: vec![1],
            axiom: "r".to_owned(),
            active: true,
            backward: false,
            cost: None,
        };
        let forward = c.step_style(StepKind::Chain, &step);
        step.backward = true;
        let backward = c.step_style(StepKind::Chain, &step);
        assert_ne!(forward.color, backward.color);

        step.active = false;
        let inactive = c.step_style(StepKind::Chain, &step);
        assert_eq!(inactive.color, "lightgray");
        assert_eq!(inactive.font_color, "darkgray");
    }

    #[test]
    fn ranks_skip_unplaced() {
        let lits = [
            Literal::new(0, Some(1), true, "observable", "a"),
            Literal::new(1, None, true, "observable", "b"),
            Literal::new(2, Some(0), false, "hypothesis", "c"),
            Literal::new(3, Some(1), true, "hypothesis", "d"),
        ];
        let ranks = rank_groups(lits.iter());
        assert_eq!(ranks.len(), 2);
        assert_eq!(ranks[&0], vec![2]);
        assert_eq!(ranks[&1], vec![0, 3]);
    }

    #[test]
    fn labels_carry_cost() {
        let step = Step {
            id: 0,
            tail: vec![0],
            head: vec![1],
            axiom: "r1".to_owned(),
            active: true,
            backward: false,
            cost: Some(1.5),
        };
        assert_eq!(step_label(&step, StepKind::Chain, "\\n"), "r1\\n$1.50");
        assert_eq!(step_label(&step, StepKind::Chain, "\n"), "r1\n$1.50");
        assert_eq!(step_label(&step, StepKind::Candidate, "\n"), "$1.50");
    }

    proptest! {
        #[test]
        fn hue_is_monotonic(a in 0u32..100, b in 0u32..100) {
            let c = StyleConfig::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(c.hue(Some(lo)) <= c.hue(Some(hi)));
            prop_assert!(c.hue(Some(hi)) <= c.hue_ceiling);
        }

        #[test]
        fn channels_stay_in_bounds(depth in 0u32..1000, floor in 0u8..200, span in 0u8..56) {
            let c = StyleConfig {
                intensity_floor: floor,
                intensity_ceiling: floor + span,
                ..StyleConfig::default()
            };
            let Rgb(r, g, b) = c.depth_color(Some(depth));
            for ch in [r, g, b] {
                prop_assert!(ch >= floor && ch <= floor + span);
            }
        }
    }
}
