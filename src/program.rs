/*!
    program images, as stored in the fabric's instruction region

    [read_program] works without allocator so a runtime can check what is currently loaded, [Program] is the owned result of a compilation
*/

use crate::instruction::{Instruction, DecodeError};


/**
    decode instruction words until the terminating [Instruction::End], which is included in the result

    words following the END are never looked at, since the engine never reaches them
*/
pub fn read_program<const N: usize>(words: impl IntoIterator<Item=u64>) -> Result<heapless::Vec<Instruction, N>, DecodeError> {
    let mut program = heapless::Vec::new();
    for word in words {
        let instruction = Instruction::decode(word)?;
        program.push(instruction) .map_err(|_| DecodeError::Overflow)?;
        if instruction == Instruction::End
            {return Ok(program)}
    }
    Err(DecodeError::MissingEnd)
}


#[cfg(feature = "planner")]
pub use owned::Program;

#[cfg(feature = "planner")]
mod owned {
    use packbytes::ToBytes;
    use std::vec::Vec;
    use crate::{
        instruction::Instruction,
        planner::Error,
        };

    /// linear instruction program, replayed identically by the engine at every tick
    #[derive(Clone, Debug, PartialEq, Eq, Default)]
    pub struct Program {
        instructions: Vec<Instruction>,
    }
    impl Program {
        pub fn new(instructions: Vec<Instruction>) -> Self {
            Self {instructions}
        }
        pub fn instructions(&self) -> &[Instruction] {&self.instructions}
        pub fn len(&self) -> usize {self.instructions.len()}
        pub fn is_empty(&self) -> bool {self.instructions.is_empty()}

        /// encoded instruction words, in execution order
        pub fn words(&self) -> impl Iterator<Item=u64> + '_ {
            self.instructions.iter().map(Instruction::encode)
        }
        /// bus cycles spent by one replay of the program
        pub fn cycles(&self) -> u64 {
            self.instructions.iter().map(Instruction::cycles).sum()
        }
        /// byte image to upload in the instruction region
        pub fn to_le_bytes(&self) -> Vec<u8> {
            self.instructions.iter()
                .flat_map(|instruction| instruction.to_le_bytes())
                .collect()
        }
        /**
            copy the program at the start of a fixed size instruction region

            the rest of the region is left untouched, it is never executed since the program ends with [Instruction::End]. Nothing is written if a wait does not fit its 48 bit field
        */
        pub fn write_to(&self, region: &mut [u64]) -> Result<usize, Error> {
            if self.instructions.len() > region.len() {
                return Err(Error::ProgramTooLarge {
                    size: self.instructions.len(),
                    capacity: region.len(),
                    })
            }
            for instruction in &self.instructions {
                if instruction.checked_encode().is_none()
                    {return Err(Error::WaitOverflow(instruction.cycles()))}
            }
            for (slot, word) in region.iter_mut().zip(self.words()) {
                *slot = word;
            }
            Ok(self.instructions.len())
        }
    }
    impl<'p> IntoIterator for &'p Program {
        type Item = &'p Instruction;
        type IntoIter = core::slice::Iter<'p, Instruction>;
        fn into_iter(self) -> Self::IntoIter {
            self.instructions.iter()
        }
    }
}
