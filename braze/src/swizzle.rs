//! Texture channel swizzles.

use std::fmt;

/// Selector for a single swizzle lane.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Lane {
  R,
  G,
  B,
  A,

  /// Constant 0.
  Zero,

  /// Constant 1.
  One,
}

impl Lane {
  const fn encode(self) -> u16 {
    match self {
      Lane::R => 0,
      Lane::G => 1,
      Lane::B => 2,
      Lane::A => 3,
      Lane::Zero => 4,
      Lane::One => 5,
    }
  }

  fn decode(bits: u16) -> Lane {
    match bits {
      0 => Lane::R,
      1 => Lane::G,
      2 => Lane::B,
      3 => Lane::A,
      4 => Lane::Zero,
      _ => Lane::One,
    }
  }

  fn letter(self) -> char {
    match self {
      Lane::R => 'r',
      Lane::G => 'g',
      Lane::B => 'b',
      Lane::A => 'a',
      Lane::Zero => '0',
      Lane::One => '1',
    }
  }
}

/// A packed 4-component channel permutation applied when a texture is sampled.
///
/// One swizzle is recorded per sampler binding; the backend maps it onto the texture view or
/// emits it into the sampling expression, whichever the API supports.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Swizzle(u16);

impl Swizzle {
  /// The identity swizzle.
  pub const RGBA: Swizzle = Swizzle::new(Lane::R, Lane::G, Lane::B, Lane::A);

  /// Red and blue exchanged, for BGRA-ordered formats.
  pub const BGRA: Swizzle = Swizzle::new(Lane::B, Lane::G, Lane::R, Lane::A);

  /// Alpha replicated into the color channels, for alpha-only formats.
  pub const AAAA: Swizzle = Swizzle::new(Lane::A, Lane::A, Lane::A, Lane::A);

  /// Red broadcast with opaque alpha, for single-channel formats sampled as gray.
  pub const RRR1: Swizzle = Swizzle::new(Lane::R, Lane::R, Lane::R, Lane::One);

  pub const fn new(r: Lane, g: Lane, b: Lane, a: Lane) -> Swizzle {
    Swizzle(r.encode() | g.encode() << 4 | b.encode() << 8 | a.encode() << 12)
  }

  /// The selector for output lane `i`, 0 to 3.
  pub fn lane(self, i: u32) -> Lane {
    assert!(i < 4);
    Lane::decode(self.0 >> (i * 4) & 0xF)
  }

  /// Compose two swizzles: `a.concat(b)` selects through `a` first, then `b`.
  pub fn concat(self, next: Swizzle) -> Swizzle {
    let mut packed = 0;
    for i in 0..4 {
      let lane = match next.lane(i) {
        Lane::R => self.lane(0),
        Lane::G => self.lane(1),
        Lane::B => self.lane(2),
        Lane::A => self.lane(3),
        constant => constant,
      };
      packed |= lane.encode() << (i * 4);
    }
    Swizzle(packed)
  }
}

impl fmt::Display for Swizzle {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    for i in 0..4 {
      write!(f, "{}", self.lane(i).letter())?;
    }
    Ok(())
  }
}

impl fmt::Debug for Swizzle {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "Swizzle({})", self)
  }
}
