use crate::{assert, IllegalArgument};
use core::ops::Range;

/// Storage layout of a tiled matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Every tile is stored.
    General,
    /// Only the tiles on and above the diagonal are stored.
    Upper,
    /// Only the tiles on and below the diagonal are stored.
    Lower,
    /// Band matrix with `kl` subdiagonals and `ku` superdiagonals. The upper band is widened by
    /// `kl` to leave room for the fill-in of a pivoted factorization.
    GeneralBand,
    /// Upper band matrix with `ku` superdiagonals.
    UpperBand,
    /// Lower band matrix with `kl` subdiagonals.
    LowerBand,
}

impl Layout {
    /// Returns `true` for the three band layouts.
    #[inline]
    pub fn is_band(self) -> bool {
        matches!(
            self,
            Layout::GeneralBand | Layout::UpperBand | Layout::LowerBand
        )
    }
}

/// Physical location of one tile inside the arena of a tiled matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileAddr {
    /// Offset of the first element of the tile in the arena.
    pub offset: usize,
    /// Leading dimension of the tile, which is stored column-major.
    pub ld: usize,
    /// Number of elements reserved for the tile.
    pub len: usize,
}

/// Descriptor of a tiled matrix.
///
/// A matrix of dimensions `m × n` is cut into an `mt × nt` grid of tiles of dimensions
/// `mb × nb`, where the tiles of the last tile row and tile column may be smaller. Each tile is
/// stored contiguously in column-major order, and the tiles are laid out in a single arena whose
/// length is [`TileDesc::storage_len`].
///
/// # General layout
/// The full `mb × nb` tiles come first, in row-major order over the tile grid. They are followed
/// by the tiles of the last partial tile row (`rm × nb` each), then the tiles of the last partial
/// tile column (`mb × rn` each), then the partial corner tile (`rm × rn`), where `rm = m % mb`
/// and `rn = n % nb`.
///
/// # Triangular layouts
/// Only the tiles of one triangle are stored, the full tiles being packed column by column,
/// followed by the partial tile column (upper) or tile row (lower), then the corner.
///
/// # Band layouts
/// Only the tiles that intersect the band are stored. Tile `(m, n)` is stored at tile row
/// `kut - 1 + m - n` of a general arena with `klt + kut - 1` tile rows, where `klt` and `kut` are
/// the number of tile diagonals below and above (including) the main one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileDesc {
    layout: Layout,

    m: usize,
    n: usize,
    mb: usize,
    nb: usize,
    mt: usize,
    nt: usize,

    kl: usize,
    ku: usize,
    klt: usize,
    kut: usize,

    // stored geometry
    lm1: usize,
    ln1: usize,
    rm: usize,
    rn: usize,

    a21: usize,
    a12: usize,
    a22: usize,
    len: usize,
}

#[inline]
fn div_ceil(a: usize, b: usize) -> usize {
    a / b + (a % b != 0) as usize
}

#[inline]
fn triangle(k: usize) -> usize {
    k * (k + 1) / 2
}

impl TileDesc {
    fn new_unchecked(
        layout: Layout,
        m: usize,
        n: usize,
        mb: usize,
        nb: usize,
        kl: usize,
        ku: usize,
    ) -> Self {
        let (klt, kut) = match layout {
            Layout::GeneralBand => (div_ceil(kl, mb) + 1, div_ceil(kl + ku, nb) + 1),
            Layout::UpperBand => (1, div_ceil(ku, nb) + 1),
            Layout::LowerBand => (div_ceil(kl, mb) + 1, 1),
            Layout::General | Layout::Upper | Layout::Lower => (0, 0),
        };

        let (gm, gn) = if layout.is_band() {
            ((klt + kut - 1) * mb, n)
        } else {
            (m, n)
        };

        let (lm1, ln1) = (gm / mb, gn / nb);
        let (rm, rn) = (gm % mb, gn % nb);

        let (a21, a12, a22) = match layout {
            Layout::Upper => {
                let a12 = triangle(lm1) * mb * nb;
                (a12, a12, a12 + mb * rn * lm1)
            }
            Layout::Lower => {
                let a21 = triangle(lm1) * mb * nb;
                let a22 = a21 + rm * nb * ln1;
                (a21, a22, a22)
            }
            _ => {
                let a21 = lm1 * ln1 * mb * nb;
                let a12 = a21 + rm * nb * ln1;
                (a21, a12, a12 + mb * rn * lm1)
            }
        };

        Self {
            layout,
            m,
            n,
            mb,
            nb,
            mt: div_ceil(m, mb),
            nt: div_ceil(n, nb),
            kl,
            ku,
            klt,
            kut,
            lm1,
            ln1,
            rm,
            rn,
            a21,
            a12,
            a22,
            len: a22 + rm * rn,
        }
    }

    /// Creates a descriptor for an `m × n` matrix stored in `mb × nb` tiles, with every tile
    /// stored.
    ///
    /// # Errors
    /// Returns an error if one of the tile dimensions is zero.
    pub fn general(m: usize, n: usize, mb: usize, nb: usize) -> Result<Self, IllegalArgument> {
        if mb == 0 {
            return Err(IllegalArgument::new("mb"));
        }
        if nb == 0 {
            return Err(IllegalArgument::new("nb"));
        }
        Ok(Self::new_unchecked(Layout::General, m, n, mb, nb, 0, 0))
    }

    /// Creates a descriptor for a square `m × n` matrix of which only one triangle is stored,
    /// with square tiles.
    ///
    /// # Errors
    /// Returns an error if `layout` is not [`Layout::Upper`] or [`Layout::Lower`], if the matrix
    /// is not square, or if the tiles are not square or empty.
    pub fn triangular(
        layout: Layout,
        m: usize,
        n: usize,
        mb: usize,
        nb: usize,
    ) -> Result<Self, IllegalArgument> {
        if !matches!(layout, Layout::Upper | Layout::Lower) {
            return Err(IllegalArgument::new("layout"));
        }
        if m != n {
            return Err(IllegalArgument::new("n"));
        }
        if mb == 0 {
            return Err(IllegalArgument::new("mb"));
        }
        if nb != mb {
            return Err(IllegalArgument::new("nb"));
        }
        Ok(Self::new_unchecked(layout, m, n, mb, nb, 0, 0))
    }

    /// Creates a descriptor for an `m × n` band matrix with `kl` subdiagonals and `ku`
    /// superdiagonals, stored in square tiles.
    ///
    /// # Errors
    /// Returns an error if `layout` is not a band layout, or if the tiles are not square or
    /// empty.
    pub fn band(
        layout: Layout,
        m: usize,
        n: usize,
        mb: usize,
        nb: usize,
        kl: usize,
        ku: usize,
    ) -> Result<Self, IllegalArgument> {
        if !layout.is_band() {
            return Err(IllegalArgument::new("layout"));
        }
        if mb == 0 {
            return Err(IllegalArgument::new("mb"));
        }
        if nb != mb {
            return Err(IllegalArgument::new("nb"));
        }
        let (kl, ku) = match layout {
            Layout::UpperBand => (0, ku),
            Layout::LowerBand => (kl, 0),
            _ => (kl, ku),
        };
        Ok(Self::new_unchecked(layout, m, n, mb, nb, kl, ku))
    }

    /// Returns the storage layout.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }
    /// Returns the number of rows of the matrix.
    #[inline]
    pub fn m(&self) -> usize {
        self.m
    }
    /// Returns the number of columns of the matrix.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }
    /// Returns the number of rows of a full tile.
    #[inline]
    pub fn mb(&self) -> usize {
        self.mb
    }
    /// Returns the number of columns of a full tile.
    #[inline]
    pub fn nb(&self) -> usize {
        self.nb
    }
    /// Returns the number of tile rows.
    #[inline]
    pub fn mt(&self) -> usize {
        self.mt
    }
    /// Returns the number of tile columns.
    #[inline]
    pub fn nt(&self) -> usize {
        self.nt
    }
    /// Returns the number of subdiagonals of a band matrix.
    #[inline]
    pub fn kl(&self) -> usize {
        self.kl
    }
    /// Returns the number of superdiagonals of a band matrix.
    #[inline]
    pub fn ku(&self) -> usize {
        self.ku
    }
    /// Returns the number of stored tile diagonals on and below the main one, for band layouts.
    #[inline]
    pub fn klt(&self) -> usize {
        self.klt
    }
    /// Returns the number of stored tile diagonals on and above the main one, for band layouts.
    #[inline]
    pub fn kut(&self) -> usize {
        self.kut
    }
    /// Returns the number of elements of the arena backing the matrix.
    #[inline]
    pub fn storage_len(&self) -> usize {
        self.len
    }

    /// Returns the number of rows of the tiles on tile row `m`.
    #[track_caller]
    #[inline]
    pub fn tile_nrows(&self, m: usize) -> usize {
        assert!(m < self.mt);
        Ord::min(self.mb, self.m - m * self.mb)
    }

    /// Returns the number of columns of the tiles on tile column `n`.
    #[track_caller]
    #[inline]
    pub fn tile_ncols(&self, n: usize) -> usize {
        assert!(n < self.nt);
        Ord::min(self.nb, self.n - n * self.nb)
    }

    /// Returns `true` if the tile `(m, n)` is inside the tile grid and backed by storage.
    ///
    /// Tiles outside the stored triangle or band are logically zero.
    #[inline]
    pub fn is_stored(&self, m: usize, n: usize) -> bool {
        if m >= self.mt || n >= self.nt {
            return false;
        }
        match self.layout {
            Layout::General => true,
            Layout::Upper => m <= n,
            Layout::Lower => m >= n,
            Layout::GeneralBand | Layout::UpperBand | Layout::LowerBand => {
                m + self.kut > n && m < n + self.klt
            }
        }
    }

    fn general_addr(&self, mm: usize, nn: usize) -> TileAddr {
        let (mb, nb) = (self.mb, self.nb);
        if mm < self.lm1 {
            if nn < self.ln1 {
                TileAddr {
                    offset: mb * nb * (nn + self.ln1 * mm),
                    ld: mb,
                    len: mb * nb,
                }
            } else {
                TileAddr {
                    offset: self.a12 + mb * self.rn * mm,
                    ld: mb,
                    len: mb * self.rn,
                }
            }
        } else if nn < self.ln1 {
            TileAddr {
                offset: self.a21 + self.rm * nb * nn,
                ld: self.rm,
                len: self.rm * nb,
            }
        } else {
            TileAddr {
                offset: self.a22,
                ld: self.rm,
                len: self.rm * self.rn,
            }
        }
    }

    fn upper_addr(&self, mm: usize, nn: usize) -> TileAddr {
        let (mb, nb) = (self.mb, self.nb);
        if nn < self.ln1 {
            TileAddr {
                offset: mb * nb * (mm + triangle(nn)),
                ld: mb,
                len: mb * nb,
            }
        } else if mm < self.lm1 {
            TileAddr {
                offset: self.a12 + mb * self.rn * mm,
                ld: mb,
                len: mb * self.rn,
            }
        } else {
            TileAddr {
                offset: self.a22,
                ld: self.rm,
                len: self.rm * self.rn,
            }
        }
    }

    fn lower_addr(&self, mm: usize, nn: usize) -> TileAddr {
        let (mb, nb) = (self.mb, self.nb);
        if mm < self.lm1 {
            TileAddr {
                offset: mb * nb * ((mm - nn) + nn * (2 * self.lm1 - nn + 1) / 2),
                ld: mb,
                len: mb * nb,
            }
        } else if nn < self.ln1 {
            TileAddr {
                offset: self.a21 + self.rm * nb * nn,
                ld: self.rm,
                len: self.rm * nb,
            }
        } else {
            TileAddr {
                offset: self.a22,
                ld: self.rm,
                len: self.rm * self.rn,
            }
        }
    }

    /// Returns the location of the tile `(m, n)` in the arena.
    ///
    /// # Panics
    /// Panics if the tile is outside the grid, or is not stored (see [`TileDesc::is_stored`]).
    #[track_caller]
    pub fn tile_addr(&self, m: usize, n: usize) -> TileAddr {
        assert!(all(m < self.mt, n < self.nt));
        assert!(self.is_stored(m, n));
        match self.layout {
            Layout::General => self.general_addr(m, n),
            Layout::Upper => self.upper_addr(m, n),
            Layout::Lower => self.lower_addr(m, n),
            Layout::GeneralBand | Layout::UpperBand | Layout::LowerBand => {
                self.general_addr(self.kut - 1 + m - n, n)
            }
        }
    }

    /// Returns the range of tile rows that hold nonzero elements of tile column `n`.
    ///
    /// For band layouts, this is the smallest range of tiles covering every element of the band
    /// in that column, and it is empty only when the band has no element there.
    #[track_caller]
    pub fn tile_row_range(&self, n: usize) -> Range<usize> {
        assert!(n < self.nt);
        let (kl, ku) = (self.kl, self.ku);
        let (above, below) = match self.layout {
            Layout::General => return 0..self.mt,
            Layout::Upper => return 0..Ord::min(n + 1, self.mt),
            Layout::Lower => return Ord::min(n, self.mt)..self.mt,
            Layout::GeneralBand => (ku + kl, kl),
            Layout::UpperBand => (ku, 0),
            Layout::LowerBand => (0, kl),
        };
        if self.m == 0 {
            return 0..0;
        }

        let first_col = n * self.nb;
        let last_col = Ord::min(self.n, (n + 1) * self.nb) - 1;
        let first_row = first_col.saturating_sub(above);
        let last_row = Ord::min(self.m - 1, last_col + below);
        if first_row > last_row {
            return 0..0;
        }
        first_row / self.mb..last_row / self.mb + 1
    }

    /// Returns the range of tile columns that hold nonzero elements of tile row `m`.
    ///
    /// For band layouts, this is the smallest range of tiles covering every element of the band
    /// in that row, and it is empty only when the band has no element there.
    #[track_caller]
    pub fn tile_col_range(&self, m: usize) -> Range<usize> {
        assert!(m < self.mt);
        let (kl, ku) = (self.kl, self.ku);
        let (above, below) = match self.layout {
            Layout::General => return 0..self.nt,
            Layout::Upper => return Ord::min(m, self.nt)..self.nt,
            Layout::Lower => return 0..Ord::min(m + 1, self.nt),
            Layout::GeneralBand => (ku + kl, kl),
            Layout::UpperBand => (ku, 0),
            Layout::LowerBand => (0, kl),
        };
        if self.n == 0 {
            return 0..0;
        }

        let first_row = m * self.mb;
        let last_row = Ord::min(self.m, (m + 1) * self.mb) - 1;
        let first_col = first_row.saturating_sub(below);
        let last_col = Ord::min(self.n - 1, last_row + above);
        if first_col > last_col {
            return 0..0;
        }
        first_col / self.nb..last_col / self.nb + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;
    use proptest::prelude::*;

    fn layouts() -> impl Strategy<Value = Layout> {
        prop_oneof![
            Just(Layout::General),
            Just(Layout::Upper),
            Just(Layout::Lower),
            Just(Layout::GeneralBand),
            Just(Layout::UpperBand),
            Just(Layout::LowerBand),
        ]
    }

    fn descriptors() -> impl Strategy<Value = TileDesc> {
        (layouts(), 0..40usize, 0..40usize, 1..9usize, 1..9usize, 0..20usize, 0..20usize)
            .prop_map(|(layout, m, n, mb, nb, kl, ku)| match layout {
                Layout::General => TileDesc::general(m, n, mb, nb).unwrap(),
                Layout::Upper | Layout::Lower => TileDesc::triangular(layout, m, m, mb, mb).unwrap(),
                _ => TileDesc::band(layout, m, n, mb, mb, kl, ku).unwrap(),
            })
    }

    /// Returns whether the element `(i, j)` lies inside the band, for band layouts.
    fn in_band(desc: &TileDesc, i: usize, j: usize) -> bool {
        let (kl, ku) = (desc.kl() as isize, desc.ku() as isize);
        let d = i as isize - j as isize;
        match desc.layout() {
            Layout::GeneralBand => -(ku + kl) <= d && d <= kl,
            Layout::UpperBand => -ku <= d && d <= 0,
            Layout::LowerBand => 0 <= d && d <= kl,
            _ => unreachable!(),
        }
    }

    proptest! {
        #[test]
        fn tile_addresses_do_not_alias(desc in descriptors()) {
            let mut regions = Vec::new();
            for m in 0..desc.mt() {
                for n in 0..desc.nt() {
                    if !desc.is_stored(m, n) {
                        continue;
                    }
                    let addr = desc.tile_addr(m, n);
                    prop_assert!(addr.ld >= desc.tile_nrows(m));
                    prop_assert_eq!(addr.len, addr.ld * desc.tile_ncols(n));
                    prop_assert!(addr.offset + addr.len <= desc.storage_len());
                    regions.push((addr.offset, addr.offset + addr.len));
                }
            }
            regions.sort_unstable();
            for pair in regions.windows(2) {
                prop_assert!(pair[0].1 <= pair[1].0);
            }
            if !desc.layout().is_band() {
                let total: usize = regions.iter().map(|(start, end)| end - start).sum();
                prop_assert_eq!(total, desc.storage_len());
            }
        }

        #[test]
        fn band_ranges_are_minimal(desc in descriptors()) {
            prop_assume!(desc.layout().is_band());
            let (mb, nb) = (desc.mb(), desc.nb());

            for n in 0..desc.nt() {
                let mut expected: Option<(usize, usize)> = None;
                for j in n * nb..Ord::min(desc.n(), (n + 1) * nb) {
                    for i in 0..desc.m() {
                        if in_band(&desc, i, j) {
                            let t = i / mb;
                            expected = Some(match expected {
                                None => (t, t),
                                Some((lo, hi)) => (Ord::min(lo, t), Ord::max(hi, t)),
                            });
                        }
                    }
                }
                let range = desc.tile_row_range(n);
                match expected {
                    None => prop_assert!(range.is_empty()),
                    Some((lo, hi)) => prop_assert_eq!(range.clone(), lo..hi + 1),
                }
                for m in range {
                    prop_assert!(desc.is_stored(m, n));
                }
            }

            for m in 0..desc.mt() {
                let mut expected: Option<(usize, usize)> = None;
                for i in m * mb..Ord::min(desc.m(), (m + 1) * mb) {
                    for j in 0..desc.n() {
                        if in_band(&desc, i, j) {
                            let t = j / nb;
                            expected = Some(match expected {
                                None => (t, t),
                                Some((lo, hi)) => (Ord::min(lo, t), Ord::max(hi, t)),
                            });
                        }
                    }
                }
                let range = desc.tile_col_range(m);
                match expected {
                    None => prop_assert!(range.is_empty()),
                    Some((lo, hi)) => prop_assert_eq!(range.clone(), lo..hi + 1),
                }
                for n in range {
                    prop_assert!(desc.is_stored(m, n));
                }
            }
        }
    }

    #[test]
    fn test_general_layout() {
        let desc = TileDesc::general(10, 7, 4, 3).unwrap();
        assert_eq!((desc.mt(), desc.nt()), (3, 3));
        assert_eq!(desc.storage_len(), 70);

        // full tiles are row-major over the grid
        assert_eq!(desc.tile_addr(0, 0), TileAddr { offset: 0, ld: 4, len: 12 });
        assert_eq!(desc.tile_addr(0, 1), TileAddr { offset: 12, ld: 4, len: 12 });
        assert_eq!(desc.tile_addr(1, 0), TileAddr { offset: 24, ld: 4, len: 12 });
        // last partial tile row, then last partial tile column, then the corner
        assert_eq!(desc.tile_addr(2, 0), TileAddr { offset: 48, ld: 2, len: 6 });
        assert_eq!(desc.tile_addr(2, 1), TileAddr { offset: 54, ld: 2, len: 6 });
        assert_eq!(desc.tile_addr(0, 2), TileAddr { offset: 60, ld: 4, len: 4 });
        assert_eq!(desc.tile_addr(1, 2), TileAddr { offset: 64, ld: 4, len: 4 });
        assert_eq!(desc.tile_addr(2, 2), TileAddr { offset: 68, ld: 2, len: 2 });

        assert_eq!((desc.tile_nrows(2), desc.tile_ncols(2)), (2, 1));
        assert_eq!(desc.tile_row_range(1), 0..3);
    }

    #[test]
    fn test_band_widths() {
        let desc = TileDesc::band(Layout::GeneralBand, 20, 20, 4, 4, 3, 2).unwrap();
        assert_eq!((desc.klt(), desc.kut()), (2, 3));
        let desc = TileDesc::band(Layout::UpperBand, 20, 20, 4, 4, 3, 5).unwrap();
        assert_eq!((desc.klt(), desc.kut(), desc.kl()), (1, 3, 0));
        let desc = TileDesc::band(Layout::LowerBand, 20, 20, 4, 4, 8, 5).unwrap();
        assert_eq!((desc.klt(), desc.kut(), desc.ku()), (3, 1, 0));

        assert_eq!(desc.tile_row_range(0), 0..3);
        assert_eq!(desc.tile_row_range(4), 4..5);
        assert!(desc.is_stored(2, 0));
        assert!(!desc.is_stored(3, 0));
        assert!(!desc.is_stored(0, 1));
    }

    #[test]
    fn test_invalid_descriptors() {
        assert_eq!(TileDesc::general(4, 4, 0, 2).unwrap_err().arg, "mb");
        assert_eq!(TileDesc::general(4, 4, 2, 0).unwrap_err().arg, "nb");
        assert_eq!(
            TileDesc::triangular(Layout::Upper, 4, 5, 2, 2).unwrap_err().arg,
            "n"
        );
        assert_eq!(
            TileDesc::triangular(Layout::General, 4, 4, 2, 2).unwrap_err().arg,
            "layout"
        );
        assert_eq!(
            TileDesc::band(Layout::LowerBand, 8, 8, 2, 4, 1, 1).unwrap_err().arg,
            "nb"
        );
    }

    #[test]
    #[should_panic]
    fn test_out_of_band_tile_panics() {
        let desc = TileDesc::band(Layout::UpperBand, 8, 8, 2, 2, 0, 1).unwrap();
        desc.tile_addr(3, 0);
    }
}
