//! External merge sort over tapes
//!
//! The engine never holds more than `cutoff` elements in memory. It works in
//! two phases:
//!
//! 1. **Split.** The source is read in chunks of `cutoff` elements; each chunk
//!    is sorted in memory and written out, alternating between the destination
//!    and a scratch tape. Both tapes then hold runs of sorted blocks.
//! 2. **Merge.** Pairs of blocks are merged into blocks of twice the size on
//!    a second pair of tapes, and the pairs swap roles every pass until a
//!    single block remains.
//!
//! Sources are read backwards during a merge, from the tail of each block
//! towards its head, so a tape is never rewound: the head is already at the
//! tail when a pass starts. Reading an ascending block backwards yields
//! descending values, so passes alternate between emitting descending blocks
//! (odd passes) and ascending blocks (even passes). After an odd number of
//! passes the fully merged data sits descending on a scratch tape and is
//! copied back to the destination in reverse.
//!
//! All blocks have `block_size` elements except the last one of the whole
//! sequence. Because each pass reverses block order, that short block sits at
//! the tail of the tapes on odd passes and at the head on even passes; see
//! [`MergePass::layer_sizes`].

use crate::error::{Result, TapeError};
use crate::tape::{Element, Tape, TapeFactory, TapeReader};
use serde::Serialize;
use tracing::{debug, info, trace};

/// Summary of one sort call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortStats {
    /// Elements sorted
    pub count: usize,
    /// In-memory chunk size
    pub cutoff: usize,
    /// Sorted blocks produced by the split phase
    pub initial_blocks: usize,
    /// Merge passes run
    pub merge_passes: usize,
    /// Whether the result had to be copied back to the destination reversed
    pub reversed_copy: bool,
}

/// Sort `count` elements from `src` into `dst`
///
/// `src` must be positioned on the first element to sort and `dst` on the
/// first slot to write; `dst` needs room for `count` elements from there.
/// On success `dst` holds the elements in non-decreasing order and its head
/// is back on the first of them. Three scratch tapes of `count` slots are
/// requested from `factory` before any merging starts.
///
/// # Errors
///
/// `InvalidArgument` if `cutoff` is zero, checked before any tape is touched.
/// Any tape or factory failure is returned as is; `dst` is then left partially
/// written.
pub fn sort<F: TapeFactory + ?Sized>(
    src: &dyn TapeReader,
    count: usize,
    dst: &mut dyn Tape,
    cutoff: usize,
    factory: &F,
) -> Result<SortStats> {
    if cutoff == 0 {
        return Err(TapeError::InvalidArgument(
            "cutoff must be a positive integer".to_string(),
        ));
    }
    if count == 0 {
        return Ok(SortStats {
            count,
            cutoff,
            initial_blocks: 0,
            merge_passes: 0,
            reversed_copy: false,
        });
    }

    info!("Sorting {} elements with cutoff {}", count, cutoff);

    let mut aux = factory.create(count)?;
    let mut next_left = factory.create(count)?;
    let mut next_right = factory.create(count)?;

    let initial_blocks = split(src, count, cutoff, dst, aux.as_mut())?;

    // Slots 0 and 1 hold the current blocks, slots 2 and 3 receive the merge.
    let mut tapes: [&mut dyn Tape; 4] = [
        dst,
        aux.as_mut(),
        next_left.as_mut(),
        next_right.as_mut(),
    ];
    let mut block_size = cutoff;
    let mut blocks = initial_blocks;
    let mut passes = 0;

    while block_size < count {
        passes += 1;
        let pass = MergePass {
            index: passes,
            block_size,
            blocks,
            count,
        };
        debug!(
            "Merge pass {}: {} blocks of {} into {} layers ({})",
            pass.index,
            pass.blocks,
            pass.block_size,
            pass.layers(),
            if pass.descending() { "descending" } else { "ascending" }
        );

        let [left, right, out_left, out_right] = &mut tapes;
        pass.run(&**left, &**right, &mut **out_left, &mut **out_right)?;

        tapes.rotate_left(2);
        block_size = block_size.saturating_mul(2);
        blocks = pass.layers();
    }

    // The destination started in slot 0 and moves between slots 0 and 2.
    let reversed_copy = passes % 2 == 1;
    let dst_slot = if reversed_copy {
        let [result, _, dst, _] = &mut tapes;
        copy_reversed(&**result, &mut **dst, count)?;
        2
    } else {
        0
    };

    for _ in 1..count {
        tapes[dst_slot].move_left();
    }

    let stats = SortStats {
        count,
        cutoff,
        initial_blocks,
        merge_passes: passes,
        reversed_copy,
    };
    info!(
        "Sorted {} elements: {} blocks, {} merge passes",
        count, initial_blocks, passes
    );
    Ok(stats)
}

/// Sort `cutoff`-sized chunks of `src` and deal them out to `dst` and `aux`
///
/// Even-numbered blocks go to `dst`, odd-numbered ones to `aux`. Each tape's
/// head ends on the last element it received. Returns the number of blocks.
fn split<'t>(
    src: &dyn TapeReader,
    count: usize,
    cutoff: usize,
    dst: &'t mut dyn Tape,
    aux: &'t mut dyn Tape,
) -> Result<usize> {
    let blocks = count.div_ceil(cutoff);
    let block_len = |block: usize| cutoff.min(count - block * cutoff);
    let dst_total: usize = (0..blocks).step_by(2).map(block_len).sum();

    let mut input = Source::forward(src, count);
    let mut outputs = [Sink::new(dst, dst_total), Sink::new(aux, count - dst_total)];
    let mut chunk: Vec<Element> = Vec::with_capacity(cutoff.min(count));

    for block in 0..blocks {
        chunk.clear();
        for _ in 0..block_len(block) {
            chunk.push(input.take()?);
        }
        chunk.sort_unstable();
        trace!("Split block {} ({} elements)", block, chunk.len());

        let output = &mut outputs[block % 2];
        for &value in &chunk {
            output.push(value)?;
        }
    }

    Ok(blocks)
}

/// Copy `count` elements read backwards from `src` forward onto `dst`
fn copy_reversed(src: &dyn Tape, dst: &mut dyn Tape, count: usize) -> Result<()> {
    let mut input = Source::backward(src, count);
    let mut output = Sink::new(dst, count);
    for _ in 0..count {
        output.push(input.take()?)?;
    }
    Ok(())
}

/// Parameters of one merge pass
#[derive(Debug, Clone, Copy)]
struct MergePass {
    /// 1-based pass number
    index: usize,
    block_size: usize,
    /// Blocks spread over the two current tapes
    blocks: usize,
    count: usize,
}

impl MergePass {
    /// Block pairs merged this pass, which is also the block count afterwards
    fn layers(&self) -> usize {
        self.blocks.div_ceil(2)
    }

    fn descending(&self) -> bool {
        self.index % 2 == 1
    }

    /// Layer holding the short block: processed first on odd passes, last on even ones
    fn short_layer(&self) -> usize {
        if self.descending() {
            0
        } else {
            self.layers() - 1
        }
    }

    /// Lengths of the left and right blocks merged in `layer`
    ///
    /// With an odd block count the short block is alone on the left tape;
    /// with an even count it is on the right, paired with a full left block.
    fn layer_sizes(&self, layer: usize) -> (usize, usize) {
        if layer != self.short_layer() {
            return (self.block_size, self.block_size);
        }

        let tail = match self.count % self.block_size {
            0 => self.block_size,
            rem => rem,
        };
        if self.blocks % 2 == 1 {
            (tail, 0)
        } else {
            (self.block_size, tail)
        }
    }

    /// Whether layer 0 is written to the tape that becomes the left one next pass
    ///
    /// Chosen so that the next pass finds the short block where
    /// [`MergePass::layer_sizes`] expects it.
    fn first_output_is_next_left(&self) -> bool {
        !self.descending() || self.layers() % 2 == 1
    }

    fn run<'t>(
        &self,
        left: &'t dyn Tape,
        right: &'t dyn Tape,
        next_left: &'t mut dyn Tape,
        next_right: &'t mut dyn Tape,
    ) -> Result<()> {
        let layers = self.layers();
        let left_total: usize = (0..layers).map(|layer| self.layer_sizes(layer).0).sum();
        let first_total: usize = (0..layers)
            .step_by(2)
            .map(|layer| {
                let (l, r) = self.layer_sizes(layer);
                l + r
            })
            .sum();

        let mut left = Source::backward(left, left_total);
        let mut right = Source::backward(right, self.count - left_total);

        let (first, second) = if self.first_output_is_next_left() {
            (next_left, next_right)
        } else {
            (next_right, next_left)
        };
        let mut outputs = [
            Sink::new(first, first_total),
            Sink::new(second, self.count - first_total),
        ];

        for layer in 0..layers {
            let (left_len, right_len) = self.layer_sizes(layer);
            merge_layer(
                &mut left,
                left_len,
                &mut right,
                right_len,
                &mut outputs[layer % 2],
                self.descending(),
            )?;
        }

        Ok(())
    }
}

/// Merge one block from each source, both read backwards, into `out`
///
/// The left value is taken when `(left < right) xor descending`.
fn merge_layer<'s, T: TapeReader + ?Sized>(
    left: &mut Source<'s, T>,
    mut left_len: usize,
    right: &mut Source<'s, T>,
    mut right_len: usize,
    out: &mut Sink<'_>,
    descending: bool,
) -> Result<()> {
    let mut left_head = if left_len > 0 { Some(left.peek()?) } else { None };
    let mut right_head = if right_len > 0 { Some(right.peek()?) } else { None };

    loop {
        let (value, source, len, head) = match (left_head, right_head) {
            (Some(l), Some(r)) if (l < r) ^ descending => {
                (l, &mut *left, &mut left_len, &mut left_head)
            }
            (Some(l), None) => (l, &mut *left, &mut left_len, &mut left_head),
            (_, Some(r)) => (r, &mut *right, &mut right_len, &mut right_head),
            (None, None) => return Ok(()),
        };

        out.push(value)?;
        source.advance()?;
        *len -= 1;
        *head = if *len > 0 { Some(source.peek()?) } else { None };
    }
}

/// Reading cursor that knows how many elements its tape still provides
///
/// The head is only moved while elements remain, so once a tape is drained it
/// rests on the last element consumed instead of running past the data. A
/// move refused while elements remain means the tape is shorter than the
/// data it should hold.
struct Source<'a, T: TapeReader + ?Sized> {
    tape: &'a T,
    remaining: usize,
    forward: bool,
}

impl<'a, T: TapeReader + ?Sized> Source<'a, T> {
    fn forward(tape: &'a T, remaining: usize) -> Self {
        Source {
            tape,
            remaining,
            forward: true,
        }
    }

    fn backward(tape: &'a T, remaining: usize) -> Self {
        Source {
            tape,
            remaining,
            forward: false,
        }
    }

    fn peek(&self) -> Result<Element> {
        self.tape.read()
    }

    fn advance(&mut self) -> Result<()> {
        self.remaining -= 1;
        if self.remaining == 0 {
            return Ok(());
        }

        let moved = if self.forward {
            self.tape.move_right()
        } else {
            self.tape.move_left()
        };
        if moved {
            Ok(())
        } else {
            Err(short_tape(self.remaining))
        }
    }

    fn take(&mut self) -> Result<Element> {
        let value = self.peek()?;
        self.advance()?;
        Ok(value)
    }
}

/// Forward writing cursor; the head stops on the last element written
struct Sink<'a> {
    tape: &'a mut dyn Tape,
    remaining: usize,
}

impl<'a> Sink<'a> {
    fn new(tape: &'a mut dyn Tape, remaining: usize) -> Self {
        Sink { tape, remaining }
    }

    fn push(&mut self, value: Element) -> Result<()> {
        self.tape.write(value)?;
        self.remaining -= 1;
        if self.remaining > 0 && !self.tape.move_right() {
            return Err(short_tape(self.remaining));
        }
        Ok(())
    }
}

fn short_tape(remaining: usize) -> TapeError {
    TapeError::InvalidArgument(format!(
        "tape ended with {} elements still to transfer",
        remaining
    ))
}
