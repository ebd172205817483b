use crate::{ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr};

macro_rules! impl_be_number {
    ($($type:ty),*) => {
        $(
            impl Serde for $type {
                fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
                    writer.write_bytes(&self.to_be_bytes())
                }

                fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                    let bytes = reader.read_array::<{ std::mem::size_of::<$type>() }>()?;
                    Ok(<$type>::from_be_bytes(bytes))
                }

                fn byte_length(&self) -> usize {
                    std::mem::size_of::<$type>()
                }
            }

            impl ConstByteLength for $type {
                fn const_byte_length() -> usize {
                    std::mem::size_of::<$type>()
                }
            }
        )*
    };
}

impl_be_number!(u8, u16, u32, u64, i32, f32, f64);

impl Serde for bool {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_bytes(&[u8::from(*self)])
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read::<u8>()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(SerdeErr::InvalidValue {
                what: "bool",
                value: u32::from(value),
            }),
        }
    }

    fn byte_length(&self) -> usize {
        1
    }
}

impl ConstByteLength for bool {
    fn const_byte_length() -> usize {
        1
    }
}
