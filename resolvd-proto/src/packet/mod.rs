pub mod header;
pub mod question;
pub mod record;

use crate::buffer::{BytePacketBuffer, ProtoError};
use header::Header;
use question::Question;
use record::ResourceRecord;

/// RR/QTYPE numbers, per the GLOSSARY plus the DNSSEC presence codes used by
/// the façade's summary (RRSIG/DS/DNSKEY are never queried for directly but
/// must still decode when they show up in a response).
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum QueryType {
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    MX,
    TXT,
    AAAA,
    DS,
    RRSIG,
    DNSKEY,
    Unknown(u16),
}

impl QueryType {
    pub fn into_num(self) -> u16 {
        match self {
            Self::A => 1,
            Self::NS => 2,
            Self::CNAME => 5,
            Self::SOA => 6,
            Self::PTR => 12,
            Self::MX => 15,
            Self::TXT => 16,
            Self::AAAA => 28,
            Self::DS => 43,
            Self::RRSIG => 46,
            Self::DNSKEY => 48,
            Self::Unknown(n) => n,
        }
    }

    pub fn from_num(num: u16) -> Self {
        match num {
            1 => Self::A,
            2 => Self::NS,
            5 => Self::CNAME,
            6 => Self::SOA,
            12 => Self::PTR,
            15 => Self::MX,
            16 => Self::TXT,
            28 => Self::AAAA,
            43 => Self::DS,
            46 => Self::RRSIG,
            48 => Self::DNSKEY,
            other => Self::Unknown(other),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum DnsClass {
    Internet,
    Unknown(u16),
}

impl DnsClass {
    pub fn into_num(self) -> u16 {
        match self {
            Self::Internet => 1,
            Self::Unknown(n) => n,
        }
    }

    pub fn from_num(num: u16) -> Self {
        match num {
            1 => Self::Internet,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DnsPacket {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub additionals: Vec<ResourceRecord>,
}

impl DnsPacket {
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtoError> {
        if bytes.len() < 12 {
            return Err(ProtoError::PacketTooShort);
        }
        let mut buffer = BytePacketBuffer::new(bytes.to_vec());
        let header = Header::read(&mut buffer)?;

        let mut questions = Vec::with_capacity(header.qdcount as usize);
        for _ in 0..header.qdcount {
            questions.push(Question::read(&mut buffer)?);
        }

        let mut answers = Vec::with_capacity(header.ancount as usize);
        for _ in 0..header.ancount {
            answers.push(ResourceRecord::read(&mut buffer)?);
        }

        let mut authorities = Vec::with_capacity(header.nscount as usize);
        for _ in 0..header.nscount {
            authorities.push(ResourceRecord::read(&mut buffer)?);
        }

        let mut additionals = Vec::with_capacity(header.arcount as usize);
        for _ in 0..header.arcount {
            additionals.push(ResourceRecord::read(&mut buffer)?);
        }

        Ok(Self {
            header,
            questions,
            answers,
            authorities,
            additionals,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, ProtoError> {
        let mut header = self.header.clone();
        header.qdcount = self.questions.len() as u16;
        header.ancount = self.answers.len() as u16;
        header.nscount = self.authorities.len() as u16;
        header.arcount = self.additionals.len() as u16;

        let mut buffer = BytePacketBuffer::default();
        header.write(&mut buffer)?;

        for question in &self.questions {
            question.write(&mut buffer)?;
        }
        for record in self
            .answers
            .iter()
            .chain(&self.authorities)
            .chain(&self.additionals)
        {
            record.write(&mut buffer)?;
        }

        Ok(buffer.into_vec())
    }

    /// Builds an outgoing query per §4.1.1: random transaction id, single
    /// question, `RD` set iff `recursion_desired`, all counts beyond
    /// `qdcount=1` left at zero.
    pub fn build_query(name: &str, qtype: QueryType, recursion_desired: bool) -> Self {
        let id = rand::random::<u16>();
        Self {
            header: Header::query(id, recursion_desired),
            questions: vec![Question::new(name, qtype)],
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
        }
    }

    /// `min(ttl)` across the answer section, or the 300s fallback when there
    /// are no answers (§3, §4.4).
    pub fn effective_ttl(&self, default_ttl: u32) -> u32 {
        self.answers
            .iter()
            .map(|record| record.ttl)
            .min()
            .unwrap_or(default_ttl)
    }

    /// Whether any section carries an RRSIG, DS, or DNSKEY record (§4.6).
    pub fn dnssec_summary(&self) -> (bool, bool, bool) {
        let mut has_rrsig = false;
        let mut has_ds = false;
        let mut has_dnskey = false;
        for record in self
            .answers
            .iter()
            .chain(&self.authorities)
            .chain(&self.additionals)
        {
            match record.rtype() {
                QueryType::RRSIG => has_rrsig = true,
                QueryType::DS => has_ds = true,
                QueryType::DNSKEY => has_dnskey = true,
                _ => {}
            }
        }
        (has_rrsig, has_ds, has_dnskey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_query_matches_literal_vector() {
        let packet = DnsPacket::build_query("google.com", QueryType::A, true);
        let bytes = packet.encode().unwrap();
        assert_eq!(bytes.len(), 28);
        assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]), 0x0100);
        assert_eq!(u16::from_be_bytes([bytes[4], bytes[5]]), 0x0001);
    }

    #[test]
    fn parses_response_with_answer_per_literal_vector() {
        let mut bytes = vec![0x04, 0xd2, 0x81, 0x80, 0, 1, 0, 1, 0, 0, 0, 0];
        bytes.extend_from_slice(&[6, b'g', b'o', b'o', b'g', b'l', b'e', 3, b'c', b'o', b'm', 0]);
        bytes.extend_from_slice(&[0, 1, 0, 1]);
        bytes.extend_from_slice(&[0xC0, 12, 0, 1, 0, 1]);
        bytes.extend_from_slice(&300u32.to_be_bytes());
        bytes.extend_from_slice(&[0, 4, 1, 2, 3, 4]);

        let packet = DnsPacket::decode(&bytes).unwrap();
        assert_eq!(packet.header.id, 1234);
        assert_eq!(packet.answers.len(), 1);
        assert_eq!(packet.answers[0].name, "google.com");
        assert_eq!(packet.answers[0].ttl, 300);
        assert_eq!(packet.effective_ttl(300), 300);
    }

    #[test]
    fn zero_answers_and_authorities_yields_no_delegation_signal() {
        let bytes = [0u8; 12];
        let packet = DnsPacket::decode(&bytes).unwrap();
        assert!(packet.answers.is_empty());
        assert!(packet.authorities.is_empty());
    }
}
