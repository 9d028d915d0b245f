/*!
    instruction words executed by the fabric's DMA engine

    a program is a sequence of 64 bit words terminated by one [Instruction::End]. The engine replays it once per hardware tick, each word taking one bus cycle except [Instruction::Wait] which idles the bus for the given number of cycles.

    ```text
    bits   | 0-7         | 8-15        | 16-31    | 32-47    | 48-55  | 56-63
    COPY   | src_station | dst_station | src_addr | dst_addr | opcode | 0
    WAIT   | cycles                                          | opcode | 0
    END/NOP| 0                                               | opcode | 0
    ```
*/

use bilge::prelude::*;
use packbytes::{FromBytes, ToBytes};

use crate::pack_word;


/// instruction selector, stored in bits 48-55
#[bitsize(8)]
#[derive(Copy, Clone, FromBits, Debug, PartialEq)]
pub enum Opcode {
    /// end of program, the engine restarts at the next tick
    End = 0,
    /// idle for one cycle
    Nop = 1,
    /// copy one register from a station to another
    Copy = 2,
    /// idle for a number of cycles
    Wait = 3,
    #[fallback]
    Unknown = 255,
}

/// layout of a copy instruction
#[bitsize(64)]
#[derive(Copy, Clone, FromBits, DebugBits, PartialEq)]
pub struct CopyWord {
    pub src_station: u8,
    pub dst_station: u8,
    pub src_addr: u16,
    pub dst_addr: u16,
    pub opcode: Opcode,
    /// must stay zero
    pub spare: u8,
}
pack_word!(CopyWord);

/// layout of every other instruction, the argument is only meaningful for [Opcode::Wait]
#[bitsize(64)]
#[derive(Copy, Clone, FromBits, DebugBits, PartialEq)]
pub struct ControlWord {
    pub argument: u48,
    pub opcode: Opcode,
    /// must stay zero
    pub spare: u8,
}
pack_word!(ControlWord);


/// a register position on the bus: the station holding it and its address in the station's memory
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "planner", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    /// index of the station on the bus, station 0 is synchronized with host memory
    pub station: u8,
    /// station-local address, in 32 bit words
    pub address: u16,
}
impl Location {
    pub const fn new(station: u8, address: u16) -> Self {
        Self {station, address}
    }
}

/// decoded instruction
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    End,
    Nop,
    Copy {
        source: Location,
        destination: Location,
    },
    /**
        idle the bus for this number of cycles

        the word only holds 48 bits: [Instruction::encode] keeps the low 48 bits of a longer wait, [Instruction::checked_encode] refuses it. Build waits with [Instruction::wait] to stay in range
    */
    Wait(u64),
}

/// reason an instruction word could not be decoded
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// opcode field holds no known instruction
    Opcode(u8),
    /// bits that must be zero for this opcode are set, the whole word is given
    Reserved(u64),
    /// no [Instruction::End] was found in the given words
    MissingEnd,
    /// the program holds more instructions than the destination buffer
    Overflow,
}

impl Instruction {
    /// longest wait a single instruction can encode
    pub const MAX_WAIT: u64 = (1 << 48) - 1;

    /// wait instruction, or `None` if `cycles` does not fit the 48 bit field
    pub fn wait(cycles: u64) -> Option<Self> {
        if cycles > Self::MAX_WAIT
            {return None}
        Some(Self::Wait(cycles))
    }
    pub const fn copy(source: Location, destination: Location) -> Self {
        Self::Copy {source, destination}
    }
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::End => Opcode::End,
            Self::Nop => Opcode::Nop,
            Self::Copy {..} => Opcode::Copy,
            Self::Wait(_) => Opcode::Wait,
        }
    }
    /// number of bus cycles the engine spends on this instruction
    pub fn cycles(&self) -> u64 {
        match self {
            Self::End => 0,
            Self::Nop | Self::Copy {..} => 1,
            Self::Wait(cycles) => *cycles,
        }
    }

    /**
        pack into an instruction word

        a wait longer than [Self::MAX_WAIT] is truncated to 48 bits, use [Self::checked_encode] when the instruction was not built by [Self::wait]
    */
    pub fn encode(&self) -> u64 {
        match *self {
            Self::Copy {source, destination} => CopyWord::new(
                source.station,
                destination.station,
                source.address,
                destination.address,
                Opcode::Copy,
                0,
                ).into(),
            Self::Wait(cycles) => control(Opcode::Wait, cycles & Self::MAX_WAIT),
            Self::Nop => control(Opcode::Nop, 0),
            Self::End => control(Opcode::End, 0),
        }
    }
    /// pack into an instruction word, or `None` for a wait the word cannot hold
    pub fn checked_encode(&self) -> Option<u64> {
        match *self {
            Self::Wait(cycles) if cycles > Self::MAX_WAIT => None,
            _ => Some(self.encode()),
        }
    }
    /// unpack an instruction word, rejecting anything the engine would not execute the expected way
    pub fn decode(word: u64) -> Result<Self, DecodeError> {
        let control = ControlWord::from(word);
        if control.spare() != 0
            {return Err(DecodeError::Reserved(word))}
        match control.opcode() {
            Opcode::Copy => {
                let copy = CopyWord::from(word);
                Ok(Self::Copy {
                    source: Location::new(copy.src_station(), copy.src_addr()),
                    destination: Location::new(copy.dst_station(), copy.dst_addr()),
                    })
            },
            Opcode::Wait => Ok(Self::Wait(control.argument().value())),
            Opcode::Nop | Opcode::End if control.argument().value() != 0 => Err(DecodeError::Reserved(word)),
            Opcode::Nop => Ok(Self::Nop),
            Opcode::End => Ok(Self::End),
            Opcode::Unknown => Err(DecodeError::Opcode((word >> 48) as u8)),
        }
    }
}

fn control(opcode: Opcode, argument: u64) -> u64 {
    ControlWord::new(u48::new(argument), opcode, 0).into()
}

impl ToBytes for Instruction {
    type Bytes = [u8; 8];

    fn to_le_bytes(self) -> Self::Bytes {
        self.encode().to_le_bytes()
    }
    fn to_be_bytes(self) -> Self::Bytes {
        self.encode().to_be_bytes()
    }
}
impl TryFrom<u64> for Instruction {
    type Error = DecodeError;
    fn try_from(word: u64) -> Result<Self, Self::Error> {
        Self::decode(word)
    }
}
impl From<Instruction> for u64 {
    fn from(instruction: Instruction) -> u64 {
        instruction.encode()
    }
}

/// decode a little endian word as found in the instruction region
pub fn decode_le(bytes: [u8; 8]) -> Result<Instruction, DecodeError> {
    Instruction::decode(ControlWord::from_le_bytes(bytes).into())
}
