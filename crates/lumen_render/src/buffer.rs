//! Shared pixel accumulation buffer and pixel visitation order.

use std::sync::atomic::{AtomicU32, Ordering};

use bytemuck::{Pod, Zeroable};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Seed for the pixel visitation permutation. Fixed: the table only
/// needs to decorrelate the visit order from scanline order, it does
/// not need to differ between runs.
const SHUFFLE_SEED: u64 = 0x5eed;

/// One accumulated pixel: running-mean color plus the frame timestamp
/// of the sample pass that last wrote it.
///
/// `Pod` so a display layer can upload the snapshot as raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Pixel {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub time: f32,
}

/// Storage cell: the four pixel channels as relaxed atomics.
///
/// Workers write disjoint cells within a pass, but a consumer may read
/// the buffer at any moment, so loads and stores race by design. Going
/// through `AtomicU32` keeps that race defined; the observable cost is
/// per-channel tearing in the consumer, which the design accepts in
/// exchange for not locking the buffer.
#[derive(Debug, Default)]
struct Cell {
    r: AtomicU32,
    g: AtomicU32,
    b: AtomicU32,
    time: AtomicU32,
}

/// A fixed-size 2D accumulation buffer, row-major.
///
/// Recreated whenever the render resolution changes; a zero-size buffer
/// is valid and simply holds no cells.
#[derive(Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl PixelBuffer {
    /// Create a zeroed buffer.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        let mut cells = Vec::with_capacity(len);
        cells.resize_with(len, Cell::default);
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels (width * height).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read one pixel. May observe a mix of channels from different
    /// passes while a render is in flight.
    pub fn load(&self, index: usize) -> Pixel {
        let cell = &self.cells[index];
        Pixel {
            r: f32::from_bits(cell.r.load(Ordering::Relaxed)),
            g: f32::from_bits(cell.g.load(Ordering::Relaxed)),
            b: f32::from_bits(cell.b.load(Ordering::Relaxed)),
            time: f32::from_bits(cell.time.load(Ordering::Relaxed)),
        }
    }

    /// Write one pixel.
    pub fn store(&self, index: usize, pixel: Pixel) {
        let cell = &self.cells[index];
        cell.r.store(pixel.r.to_bits(), Ordering::Relaxed);
        cell.g.store(pixel.g.to_bits(), Ordering::Relaxed);
        cell.b.store(pixel.b.to_bits(), Ordering::Relaxed);
        cell.time.store(pixel.time.to_bits(), Ordering::Relaxed);
    }

    /// Reset every cell to zero.
    pub fn clear(&self) {
        for index in 0..self.cells.len() {
            self.store(index, Pixel::default());
        }
    }

    /// Copy the current contents out as plain values.
    pub fn snapshot(&self) -> Vec<Pixel> {
        (0..self.cells.len()).map(|i| self.load(i)).collect()
    }
}

/// Build the pixel visitation permutation of `0..len`.
pub fn shuffle_table(len: usize) -> Vec<usize> {
    let mut table: Vec<usize> = (0..len).collect();
    table.shuffle(&mut StdRng::seed_from_u64(SHUFFLE_SEED));
    table
}
