// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lattice walk patterns.
//!
//! A pattern string is a walk over the unit lattice starting at the
//! origin. Each character is one move:
//!
//! | char | move |
//! |------|------|
//! | `0`, `+` | back to the origin |
//! | `1` `2` `3` `4` | east, north, west, south |
//! | `5` `6` `7` `8` | north-east, north-west, south-west, south-east |
//! | `9`, `.` | stay in place |
//! | `A`..`I` | as `1`..`9`, then up one unit in z |
//! | `a`..`i` | as `1`..`9`, then down one unit in z |
//! | `/` | make the next move without output |
//!
//! [`pattern`] emits the position after every move. [`line_pattern`] emits
//! a segment from the old to the new position for every move except jumps
//! back to the origin.

use std::str::FromStr;

use formex_core::{Error, Result};
use nalgebra::Point3;

use crate::formex::Formex;

/// Named line shapes, as line-chain pattern strings.
pub const SHAPES: &[(&str, &str)] = &[
    ("line", "l:1"),
    ("angle", "l:1+2"),
    ("square", "l:1234"),
    ("plus", "l:1+2+3+4"),
    ("cross", "l:5+6+7+8"),
    ("diamond", "l:/45678"),
    ("rtriangle", "l:164"),
    ("cube", "l:1234I/aI/bI/cI/41234"),
    ("star", "l:1+2+3+4+5+6+7+8"),
    ("star3d", "l:1+2+3+4+5+6+7+8+A+B+C+D+E+F+G+H+a+b+c+d+e+f+g+h"),
    ("triade", "2:01020I"),
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    /// Jump back to the origin.
    Origin,
    /// Relative lattice move.
    Move([i32; 3]),
    /// Suppress output of the next move.
    Hide,
}

fn decode(ch: char, pos: usize) -> Result<Step> {
    let (lower, dz) = match ch {
        '0' | '+' => return Ok(Step::Origin),
        '/' => return Ok(Step::Hide),
        '.' => return Ok(Step::Move([0, 0, 0])),
        '1'..='9' => (ch, 0),
        'A'..='I' => ((ch as u8 - b'A' + b'1') as char, 1),
        'a'..='i' => ((ch as u8 - b'a' + b'1') as char, -1),
        _ => return Err(Error::PatternSyntax { ch, pos }),
    };
    let (dx, dy) = match lower {
        '1' => (1, 0),
        '2' => (0, 1),
        '3' => (-1, 0),
        '4' => (0, -1),
        '5' => (1, 1),
        '6' => (-1, 1),
        '7' => (-1, -1),
        '8' => (1, -1),
        _ => (0, 0),
    };
    Ok(Step::Move([dx, dy, dz]))
}

/// Walks the pattern, calling `emit(from, to)` for every move that is not
/// hidden by a preceding `/`. Origin jumps report `to` as the origin.
fn walk<F>(s: &str, mut emit: F) -> Result<()>
where
    F: FnMut(Step, [i32; 3], [i32; 3]),
{
    let mut pos = [0i32; 3];
    let mut hidden = false;
    for (i, ch) in s.chars().enumerate() {
        let step = decode(ch, i)?;
        let from = pos;
        match step {
            Step::Hide => {
                hidden = true;
                continue;
            }
            Step::Origin => pos = [0, 0, 0],
            Step::Move(d) => {
                for k in 0..3 {
                    pos[k] += d[k];
                }
            }
        }
        if !hidden {
            emit(step, from, pos);
        }
        hidden = false;
    }
    Ok(())
}

fn point(p: [i32; 3]) -> Point3<f64> {
    Point3::new(p[0] as f64, p[1] as f64, p[2] as f64)
}

/// The lattice positions visited by the walk, one per non-hidden move.
///
/// ```
/// use formex_mesh::pattern::pattern;
/// let pts = pattern("0129")?;
/// assert_eq!(pts.len(), 4);
/// assert_eq!(pts[3], pts[2]);
/// # Ok::<(), formex_core::Error>(())
/// ```
pub fn pattern(s: &str) -> Result<Vec<Point3<f64>>> {
    let mut points = Vec::with_capacity(s.len());
    walk(s, |_, _, to| points.push(point(to)))?;
    Ok(points)
}

/// The pattern points grouped into elements of `nplex` points.
pub fn xpattern(s: &str, nplex: usize) -> Result<Vec<Vec<Point3<f64>>>> {
    if nplex == 0 {
        return Err(Error::topology("plexitude must be at least 1"));
    }
    let points = pattern(s)?;
    if points.len() % nplex != 0 {
        return Err(Error::topology(format!(
            "pattern '{}' yields {} points, not a multiple of {}",
            s,
            points.len(),
            nplex
        )));
    }
    Ok(points.chunks(nplex).map(|c| c.to_vec()).collect())
}

/// Segment end points of the walk drawn as a line chain, flattened as
/// `[start0, end0, start1, end1, ...]`.
pub fn line_pattern(s: &str) -> Result<Vec<Point3<f64>>> {
    let mut points = Vec::with_capacity(2 * s.len());
    walk(s, |step, from, to| {
        if step != Step::Origin {
            points.push(point(from));
            points.push(point(to));
        }
    })?;
    Ok(points)
}

/// One of the named [`SHAPES`] as a formex.
pub fn shape(name: &str) -> Result<Formex> {
    let (_, s) = SHAPES
        .iter()
        .find(|(n, _)| *n == name)
        .ok_or_else(|| Error::topology(format!("unknown shape '{}'", name)))?;
    Formex::from_str(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    #[test]
    fn triangles_from_digit_walk() {
        let tris = xpattern("012934", 3).unwrap();
        assert_eq!(
            tris,
            vec![
                vec![p(0., 0., 0.), p(1., 0., 0.), p(1., 1., 0.)],
                vec![p(1., 1., 0.), p(0., 1., 0.), p(0., 0., 0.)],
            ]
        );
    }

    #[test]
    fn letters_move_in_z() {
        assert_eq!(pattern("A").unwrap(), vec![p(1., 0., 1.)]);
        assert_eq!(pattern("h").unwrap(), vec![p(1., -1., -1.)]);
        assert_eq!(pattern("I.").unwrap(), vec![p(0., 0., 1.), p(0., 0., 1.)]);
    }

    #[test]
    fn slash_hides_next_point() {
        assert_eq!(pattern("1/22").unwrap(), vec![p(1., 0., 0.), p(1., 2., 0.)]);
    }

    #[test]
    fn unknown_character_is_reported_with_position() {
        assert_eq!(
            pattern("12z4").unwrap_err(),
            Error::PatternSyntax { ch: 'z', pos: 2 }
        );
        assert_eq!(pattern("1J").unwrap_err(), Error::PatternSyntax { ch: 'J', pos: 1 });
    }

    #[test]
    fn xpattern_requires_whole_elements() {
        assert!(matches!(xpattern("0123", 3), Err(Error::Topology(_))));
    }

    #[test]
    fn line_chain_skips_origin_jumps() {
        let segs = line_pattern("1+2").unwrap();
        assert_eq!(segs, vec![p(0., 0., 0.), p(1., 0., 0.), p(0., 0., 0.), p(0., 1., 0.)]);
    }

    #[test]
    fn named_shapes() {
        for (name, _) in SHAPES {
            assert!(shape(name).is_ok(), "{}", name);
        }
        assert_eq!(shape("cube").unwrap().nelems(), 12);
        assert_eq!(shape("diamond").unwrap().nelems(), 4);
        assert_eq!(shape("star3d").unwrap().nelems(), 24);
        assert_eq!(shape("triade").unwrap().element(2), &[p(0., 0., 0.), p(0., 0., 1.)]);
        assert!(shape("hexagon").is_err());
    }
}
