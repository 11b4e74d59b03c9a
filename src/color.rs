//! Clade coloring for tree viewers such as FigTree.
//!
//! Colors are evenly spaced HSV hues (saturation and value 0.7). When prior
//! centers exist, the first hue is reserved for them and the representatives
//! take the rest. Edges inside a clade take the clade's color; taxa are black
//! unless they are a representative or prior center.

use crate::assign::{CladeAssignment, Representative};
use crate::tree::NodeIndex;
use std::collections::HashMap;

pub const BLACK: &str = "#000000";

/// `count` hex colors with hues `i / count`.
pub fn palette(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let (r, g, b) = hsv_to_rgb(i as f64 / count as f64, 0.7, 0.7);
            format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
        })
        .collect()
}

#[inline]
fn channel(x: f64) -> u8 {
    (255.0 * x).round_ties_even() as u8
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (i as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Colors of edges (keyed by the child node) and taxa for one solve.
#[derive(Debug, Clone)]
pub struct CladeColoring {
    edge_colors: Vec<Option<String>>,
    taxon_colors: HashMap<String, String>,
}

impl CladeColoring {
    /// `representatives` and `prior_centers` must be the lists the assignment was built from.
    pub fn new<S: AsRef<str>>(assignment: &CladeAssignment, representatives: &[S], prior_centers: &[S]) -> Self {
        let has_priors = !prior_centers.is_empty();
        let mut colors = palette(representatives.len() + usize::from(has_priors));
        let prior_color = if has_priors { Some(colors.remove(0)) } else { None };

        let color_of = |rep: Representative| match rep {
            Representative::Selected(i) => colors.get(i).cloned(),
            Representative::Prior(_) => prior_color.clone(),
        };

        let tree = assignment.tree();
        let edge_colors = (0..tree.len())
            .map(|v| assignment.edge_clade(v).and_then(color_of))
            .collect();

        let mut taxon_colors: HashMap<String, String> =
            tree.leaf_labels().map(|label| (label.to_string(), BLACK.to_string())).collect();
        for (i, label) in representatives.iter().enumerate() {
            if let Some(color) = color_of(Representative::Selected(i)) {
                taxon_colors.insert(label.as_ref().to_string(), color);
            }
        }
        if let Some(color) = &prior_color {
            for label in prior_centers {
                taxon_colors.insert(label.as_ref().to_string(), color.clone());
            }
        }

        CladeColoring { edge_colors, taxon_colors }
    }

    /// Color of the edge above `v`, if that edge lies inside a clade.
    pub fn edge_color(&self, v: NodeIndex) -> Option<&str> {
        self.edge_colors.get(v)?.as_deref()
    }

    pub fn taxon_color(&self, label: &str) -> Option<&str> {
        self.taxon_colors.get(label).map(String::as_str)
    }
}
