use super::{DnsClass, QueryType};
use crate::buffer::{BytePacketBuffer, ProtoError};
use std::net::{Ipv4Addr, Ipv6Addr};

/// RDATA, tagged by RR type per §3. `Unknown` carries the type code alongside
/// the opaque bytes so the record can still be re-encoded verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Ns(String),
    Cname(String),
    Ptr(String),
    Mx { preference: u16, exchange: String },
    Txt(Vec<u8>),
    Soa {
        mname: String,
        rname: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    Unknown { qtype: u16, data: Vec<u8> },
}

impl RData {
    pub fn qtype(&self) -> QueryType {
        match self {
            Self::A(_) => QueryType::A,
            Self::Aaaa(_) => QueryType::AAAA,
            Self::Ns(_) => QueryType::NS,
            Self::Cname(_) => QueryType::CNAME,
            Self::Ptr(_) => QueryType::PTR,
            Self::Mx { .. } => QueryType::MX,
            Self::Txt(_) => QueryType::TXT,
            Self::Soa { .. } => QueryType::SOA,
            Self::Unknown { qtype, .. } => QueryType::Unknown(*qtype),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: String,
    pub rclass: DnsClass,
    pub ttl: u32,
    pub data: RData,
}

impl ResourceRecord {
    pub fn rtype(&self) -> QueryType {
        self.data.qtype()
    }

    pub fn read(buffer: &mut BytePacketBuffer) -> Result<Self, ProtoError> {
        let name = buffer.read_qname()?;
        let qtype = QueryType::from_num(buffer.read_u16()?);
        let rclass = DnsClass::from_num(buffer.read_u16()?);
        let ttl = buffer.read_u32()?;
        let rdlength = buffer.read_u16()? as usize;
        let rdata_start = buffer.pos();

        let data = match qtype {
            QueryType::A => {
                let raw = buffer.read_u32()?;
                RData::A(Ipv4Addr::from(raw))
            }
            QueryType::AAAA => {
                let mut segments = [0u16; 8];
                for segment in &mut segments {
                    *segment = buffer.read_u16()?;
                }
                RData::Aaaa(Ipv6Addr::from(segments))
            }
            QueryType::NS => RData::Ns(buffer.read_qname()?),
            QueryType::CNAME => RData::Cname(buffer.read_qname()?),
            QueryType::PTR => RData::Ptr(buffer.read_qname()?),
            QueryType::MX => {
                let preference = buffer.read_u16()?;
                let exchange = buffer.read_qname()?;
                RData::Mx {
                    preference,
                    exchange,
                }
            }
            QueryType::TXT => {
                let len = buffer.read()? as usize;
                let bytes = buffer.get_range(buffer.pos(), len)?.to_vec();
                buffer.step(len)?;
                RData::Txt(bytes)
            }
            QueryType::SOA => {
                let mname = buffer.read_qname()?;
                let rname = buffer.read_qname()?;
                let serial = buffer.read_u32()?;
                let refresh = buffer.read_u32()?;
                let retry = buffer.read_u32()?;
                let expire = buffer.read_u32()?;
                let minimum = buffer.read_u32()?;
                RData::Soa {
                    mname,
                    rname,
                    serial,
                    refresh,
                    retry,
                    expire,
                    minimum,
                }
            }
            QueryType::DS | QueryType::RRSIG | QueryType::DNSKEY | QueryType::Unknown(_) => {
                let data = buffer.get_range(rdata_start, rdlength)?.to_vec();
                buffer.step(rdlength)?;
                RData::Unknown {
                    qtype: qtype.into_num(),
                    data,
                }
            }
        };

        let consumed = buffer.pos() - rdata_start;
        if consumed > rdlength {
            return Err(ProtoError::RdataOverrun);
        }
        // Any padding the declared rdlength left unread (e.g. a name that
        // compressed shorter than the on-wire rdlength implied) is skipped.
        if consumed < rdlength {
            buffer.step(rdlength - consumed)?;
        }

        Ok(Self {
            name,
            rclass,
            ttl,
            data,
        })
    }

    pub fn write(&self, buffer: &mut BytePacketBuffer) -> Result<usize, ProtoError> {
        let start_pos = buffer.pos();

        buffer.write_qname(&self.name)?;
        buffer.write_u16(self.rtype().into_num())?;
        buffer.write_u16(self.rclass.into_num())?;
        buffer.write_u32(self.ttl)?;

        let rdlength_pos = buffer.pos();
        buffer.write_u16(0)?;
        let rdata_start = buffer.pos();

        match &self.data {
            RData::A(addr) => {
                for octet in addr.octets() {
                    buffer.write_u8(octet)?;
                }
            }
            RData::Aaaa(addr) => {
                for segment in addr.segments() {
                    buffer.write_u16(segment)?;
                }
            }
            RData::Ns(host) | RData::Cname(host) | RData::Ptr(host) => {
                buffer.write_qname(host)?;
            }
            RData::Mx {
                preference,
                exchange,
            } => {
                buffer.write_u16(*preference)?;
                buffer.write_qname(exchange)?;
            }
            RData::Txt(bytes) => {
                buffer.write_u8(bytes.len() as u8)?;
                for byte in bytes {
                    buffer.write_u8(*byte)?;
                }
            }
            RData::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => {
                buffer.write_qname(mname)?;
                buffer.write_qname(rname)?;
                buffer.write_u32(*serial)?;
                buffer.write_u32(*refresh)?;
                buffer.write_u32(*retry)?;
                buffer.write_u32(*expire)?;
                buffer.write_u32(*minimum)?;
            }
            RData::Unknown { data, .. } => {
                for byte in data {
                    buffer.write_u8(*byte)?;
                }
            }
        }

        let rdlength = buffer.pos() - rdata_start;
        buffer.set_u16(rdlength_pos, rdlength as u16)?;

        Ok(buffer.pos() - start_pos)
    }
}
