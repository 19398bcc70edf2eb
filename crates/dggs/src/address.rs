//! rHEALPix cell addresses.
//!
//! An address is a face letter followed by one base-9 digit per level:
//! `Q`, `Q3`, `Q33`, ... Each digit picks one of the nine sub-squares of the
//! parent, numbered row-major from the upper-left:
//!
//! ```text
//!   0 1 2
//!   3 4 5
//!   6 7 8
//! ```
//!
//! Sorting addresses as strings therefore walks the faces in N, O, P, Q, R,
//! S order and each face in depth-first row-major order.

use std::fmt;
use std::str::FromStr;

use projection::healpix::FACES;

use crate::{DggsError, Resolution, Result, MAX_RESOLUTION};

/// Address of a cell in the rHEALPix hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellAddress {
    face: char,
    digits: Vec<u8>,
}

impl CellAddress {
    /// Resolution-0 cell covering a whole face.
    pub fn face(face: char) -> Result<Self> {
        if !FACES.contains(&face) {
            return Err(DggsError::InvalidAddress(face.to_string()));
        }
        Ok(Self {
            face,
            digits: Vec::new(),
        })
    }

    /// The six resolution-0 cells in address order.
    pub fn faces() -> impl Iterator<Item = CellAddress> {
        FACES.iter().map(|&face| CellAddress {
            face,
            digits: Vec::new(),
        })
    }

    /// Parse an address such as `"P0471"`.
    pub fn parse(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let face = chars
            .next()
            .ok_or_else(|| DggsError::InvalidAddress(s.to_string()))?;
        let mut address = Self::face(face).map_err(|_| DggsError::InvalidAddress(s.to_string()))?;

        for c in chars {
            match c.to_digit(10) {
                Some(d) if d < 9 => address.digits.push(d as u8),
                _ => return Err(DggsError::InvalidAddress(s.to_string())),
            }
        }
        if address.digits.len() > MAX_RESOLUTION as usize {
            return Err(DggsError::InvalidAddress(s.to_string()));
        }
        Ok(address)
    }

    pub fn face_letter(&self) -> char {
        self.face
    }

    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// Subdivision level (number of digits).
    pub fn level(&self) -> u8 {
        self.digits.len() as u8
    }

    pub fn resolution(&self) -> Resolution {
        // Digit count is bounded by MAX_RESOLUTION on every constructor
        Resolution(self.level())
    }

    /// The nine children in digit order.
    pub fn children(&self) -> Vec<CellAddress> {
        (0u8..9)
            .map(|d| {
                let mut digits = Vec::with_capacity(self.digits.len() + 1);
                digits.extend_from_slice(&self.digits);
                digits.push(d);
                CellAddress {
                    face: self.face,
                    digits,
                }
            })
            .collect()
    }

    /// Parent cell, or `None` for a face.
    pub fn parent(&self) -> Option<CellAddress> {
        if self.digits.is_empty() {
            return None;
        }
        Some(CellAddress {
            face: self.face,
            digits: self.digits[..self.digits.len() - 1].to_vec(),
        })
    }

    /// Offset of the cell's upper-left corner from its face's upper-left
    /// corner, in fractions of the face side (x rightward, y downward), and
    /// the cell side as a fraction of the face side.
    pub fn unit_offset(&self) -> (f64, f64, f64) {
        let mut x = 0.0;
        let mut y = 0.0;
        let mut side = 1.0;
        for &d in &self.digits {
            side /= 3.0;
            x += (d % 3) as f64 * side;
            y += (d / 3) as f64 * side;
        }
        (x, y, side)
    }

    /// Column and row of the cell among the `3^level` cells along each side
    /// of its face, plus that count.
    pub fn grid_indices(&self) -> (u64, u64, u64) {
        let mut col = 0u64;
        let mut row = 0u64;
        let mut count = 1u64;
        for &d in &self.digits {
            col = col * 3 + (d % 3) as u64;
            row = row * 3 + (d / 3) as u64;
            count *= 3;
        }
        (col, row, count)
    }

    /// Address of the cell at `level` containing the unit face offset
    /// (`fx`, `fy`), both in [0, 1] measured from the face's upper-left.
    pub fn from_unit_offset(face: char, fx: f64, fy: f64, level: Resolution) -> Result<Self> {
        let mut address = Self::face(face)?;
        let mut fx = fx.clamp(0.0, 1.0);
        let mut fy = fy.clamp(0.0, 1.0);
        for _ in 0..level.level() {
            fx *= 3.0;
            fy *= 3.0;
            let col = (fx.floor() as u8).min(2);
            let row = (fy.floor() as u8).min(2);
            fx -= col as f64;
            fy -= row as f64;
            address.digits.push(row * 3 + col);
        }
        Ok(address)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.face)?;
        for d in &self.digits {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

impl FromStr for CellAddress {
    type Err = DggsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let a = CellAddress::parse("P0471").unwrap();
        assert_eq!(a.face_letter(), 'P');
        assert_eq!(a.digits(), &[0, 4, 7, 1]);
        assert_eq!(a.level(), 4);
        assert_eq!(a.to_string(), "P0471");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for bad in ["", "X12", "Q9", "Qa", "q1"] {
            assert!(CellAddress::parse(bad).is_err(), "{:?}", bad);
        }
        let too_deep = format!("N{}", "0".repeat(MAX_RESOLUTION as usize + 1));
        assert!(CellAddress::parse(&too_deep).is_err());
    }

    #[test]
    fn test_children_and_parent() {
        let a = CellAddress::parse("R5").unwrap();
        let children = a.children();
        assert_eq!(children.len(), 9);
        assert_eq!(children[0].to_string(), "R50");
        assert_eq!(children[8].to_string(), "R58");
        assert!(children.iter().all(|c| c.parent().as_ref() == Some(&a)));
        assert!(CellAddress::face('N').unwrap().parent().is_none());
    }

    #[test]
    fn test_string_order_matches_address_order() {
        let mut addresses: Vec<CellAddress> = CellAddress::faces().flat_map(|f| f.children()).collect();
        let strings: Vec<String> = addresses.iter().map(|a| a.to_string()).collect();
        let mut sorted = strings.clone();
        sorted.sort();
        assert_eq!(strings, sorted);

        addresses.sort();
        assert_eq!(addresses[0].to_string(), "N0");
    }

    #[test]
    fn test_unit_offset() {
        let (x, y, side) = CellAddress::parse("Q5").unwrap().unit_offset();
        assert!((x - 2.0 / 3.0).abs() < 1e-15);
        assert!((y - 1.0 / 3.0).abs() < 1e-15);
        assert!((side - 1.0 / 3.0).abs() < 1e-15);

        let (x, y, side) = CellAddress::parse("Q48").unwrap().unit_offset();
        assert!((x - (1.0 / 3.0 + 2.0 / 9.0)).abs() < 1e-15);
        assert!((y - (1.0 / 3.0 + 2.0 / 9.0)).abs() < 1e-15);
        assert!((side - 1.0 / 9.0).abs() < 1e-15);
    }

    #[test]
    fn test_grid_indices() {
        assert_eq!(CellAddress::parse("Q").unwrap().grid_indices(), (0, 0, 1));
        assert_eq!(CellAddress::parse("Q5").unwrap().grid_indices(), (2, 1, 3));
        assert_eq!(CellAddress::parse("Q48").unwrap().grid_indices(), (5, 5, 9));
        assert_eq!(CellAddress::parse("Q33").unwrap().grid_indices(), (0, 4, 9));
    }

    #[test]
    fn test_from_unit_offset_inverts_unit_offset() {
        let a = CellAddress::parse("S370").unwrap();
        let (x, y, side) = a.unit_offset();
        let b = CellAddress::from_unit_offset('S', x + side / 2.0, y + side / 2.0, a.resolution())
            .unwrap();
        assert_eq!(a, b);
    }
}
