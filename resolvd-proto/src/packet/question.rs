use super::{DnsClass, QueryType};
use crate::buffer::{BytePacketBuffer, ProtoError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub qtype: QueryType,
    pub qclass: DnsClass,
}

impl Question {
    pub fn new(name: impl Into<String>, qtype: QueryType) -> Self {
        Self {
            name: name.into(),
            qtype,
            qclass: DnsClass::Internet,
        }
    }

    pub fn read(buffer: &mut BytePacketBuffer) -> Result<Self, ProtoError> {
        let name = buffer.read_qname()?;
        let qtype = QueryType::from_num(buffer.read_u16()?);
        let qclass = DnsClass::from_num(buffer.read_u16()?);

        Ok(Self {
            name,
            qtype,
            qclass,
        })
    }

    pub fn write(&self, buffer: &mut BytePacketBuffer) -> Result<(), ProtoError> {
        buffer.write_qname(&self.name)?;
        buffer.write_u16(self.qtype.into_num())?;
        buffer.write_u16(self.qclass.into_num())?;
        Ok(())
    }
}
