use packbytes::ToBytes;

use tdmbus::{
    instruction::*,
    program::read_program,
    };


#[test]
fn copy_layout() {
    // words captured from a running controller
    assert_eq!(
        Instruction::decode(0x0002_0002_0000_0002),
        Ok(Instruction::copy(Location::new(2, 0), Location::new(0, 2))),
        );
    assert_eq!(
        Instruction::decode(0x0002_0003_0001_0002),
        Ok(Instruction::copy(Location::new(2, 1), Location::new(0, 3))),
        );
    assert_eq!(
        Instruction::decode(0x0002_0000_0400_0100),
        Ok(Instruction::copy(Location::new(0, 1024), Location::new(1, 0))),
        );

    let copy = Instruction::copy(Location::new(0x12, 0x5678), Location::new(0x34, 0x9abc));
    assert_eq!(copy.encode(), 0x0002_9abc_5678_3412);
}

#[test]
fn control_layout() {
    assert_eq!(Instruction::End.encode(), 0);
    assert_eq!(Instruction::Nop.encode(), 1 << 48);
    assert_eq!(Instruction::wait(27).unwrap().encode(), (3 << 48) | 27);
    assert_eq!(
        Instruction::wait(Instruction::MAX_WAIT).unwrap().encode(),
        0x0003_ffff_ffff_ffff,
        );
    assert_eq!(Instruction::wait(Instruction::MAX_WAIT + 1), None);
    // a wait built directly only keeps its low 48 bits
    let long = Instruction::Wait(Instruction::MAX_WAIT + 2);
    assert_eq!(long.checked_encode(), None);
    assert_eq!(long.encode(), (3 << 48) | 1);
    assert_eq!(Instruction::Wait(27).checked_encode(), Some((3 << 48) | 27));

    assert_eq!(Instruction::decode(0), Ok(Instruction::End));
    assert_eq!(Instruction::decode(1 << 48), Ok(Instruction::Nop));
    assert_eq!(Instruction::decode((3 << 48) | 1000), Ok(Instruction::Wait(1000)));
}

#[test]
fn reject_malformed_words() {
    assert_eq!(Instruction::decode(7 << 48), Err(DecodeError::Opcode(7)));
    // reserved top byte
    let word = (1 << 56) | (2 << 48);
    assert_eq!(Instruction::decode(word), Err(DecodeError::Reserved(word)));
    // payload on an END
    assert_eq!(Instruction::decode(5), Err(DecodeError::Reserved(5)));
}

#[test]
fn little_endian_image() {
    let copy = Instruction::copy(Location::new(1, 2), Location::new(3, 4));
    let bytes = copy.to_le_bytes();
    assert_eq!(bytes, [1, 3, 2, 0, 4, 0, 2, 0]);
    assert_eq!(decode_le(bytes), Ok(copy));
}

#[test]
fn read_back_program() {
    let copy = Instruction::copy(Location::new(1, 2), Location::new(3, 4));
    let words = [
        copy.encode(),
        Instruction::Wait(12).encode(),
        Instruction::End.encode(),
        // garbage after the end is never executed
        u64::MAX,
        ];
    let program = read_program::<8>(words).unwrap();
    assert_eq!(program.as_slice(), &[copy, Instruction::Wait(12), Instruction::End]);

    assert_eq!(read_program::<2>(words), Err(DecodeError::Overflow));
    assert_eq!(read_program::<8>(words[.. 2].iter().copied()), Err(DecodeError::MissingEnd));
    assert_eq!(read_program::<8>([u64::MAX]), Err(DecodeError::Reserved(u64::MAX)));
}
