/// implement [packbytes] traits for a 64 bit [bilge] instruction layout
#[macro_export]
macro_rules! pack_word {
    ($t:ty) => {

        impl packbytes::ToBytes for $t {
            type Bytes = [u8; 8];

            fn to_le_bytes(self) -> Self::Bytes {
                u64::from(self).to_le_bytes()
            }
            fn to_be_bytes(self) -> Self::Bytes {
                u64::from(self).to_be_bytes()
            }
        }
        impl packbytes::FromBytes for $t {
            type Bytes = [u8; 8];

            fn from_le_bytes(bytes: Self::Bytes) -> Self {
                <$t>::from(u64::from_le_bytes(bytes))
            }
            fn from_be_bytes(bytes: Self::Bytes) -> Self {
                <$t>::from(u64::from_be_bytes(bytes))
            }
        }
    };
}
