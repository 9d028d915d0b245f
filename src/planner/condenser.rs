use std::vec::Vec;

use crate::{
    instruction::Instruction,
    program::Program,
    };
use super::{
    Error,
    timing::BusTiming,
    request::TransferRequest,
    };


/**
    emit the linear program for placed transfers, given in ascending dispatch order

    idle bus cycles between two copies become a single wait instruction. The program ends with a wait rounding the replay up to the next pass boundary, so the following replay starts aligned, then the terminating END.

    the gaps are counted from cycle 0, which gives the emitted timing a few quirks:
    - wrapped transfers have negative dispatch cycles, they come first and are emitted back to back with no filler
    - the first copy after cycle 0 issues one cycle before its dispatch cycle, since a gap `g` only gets a wait of `g - 1`
    - the replay may span several passes: the gap after a wrapped transfer is measured from its negative cycle although it was emitted at the program start. On a 24 cycle pass, copies at cycles -24, -23 and 5 give a 48 cycle program where the copy dispatched at 5 issues at program cycle 29
*/
pub fn condense<'r>(timing: &BusTiming, transfers: impl IntoIterator<Item=(i64, &'r TransferRequest)>) -> Result<Program, Error> {
    let mut instructions = Vec::new();
    // cycles consumed by the emitted instructions
    let mut cycle = 0u64;
    let mut previous = 0i64;

    for (dispatch, request) in transfers {
        let gap = dispatch.saturating_sub(previous);
        // a gap of exactly 2 gets no filler and the copy issues one cycle early
        // TODO confirm against the fabric whether a gap of 2 needs a NOP
        if gap > 2 {
            let idle = gap.unsigned_abs() - 1;
            instructions.push(Instruction::wait(idle) .ok_or(Error::WaitOverflow(idle))?);
            cycle += idle;
        }
        instructions.push(Instruction::copy(request.source, request.destination));
        cycle += 1;
        previous = dispatch;
    }

    let pass = timing.full_pass_length().unsigned_abs();
    let rest = pass - cycle % pass;
    instructions.push(Instruction::wait(rest) .ok_or(Error::WaitOverflow(rest))?);
    instructions.push(Instruction::End);
    Ok(Program::new(instructions))
}
