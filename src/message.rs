//! Decoded messages

use chrono::{DateTime, Utc};

use crate::profile::{self, MesgNum};
use crate::value::Value;

/// One field of a decoded message.
#[derive(Clone, PartialEq, Debug)]
pub struct Field {
    pub num: u8,
    pub name: &'static str,
    pub value: Value,
}

/// A decoded data message.
///
/// The field set is fixed by the profile for the message's global number;
/// every field starts out as its base type's invalid sentinel and holds a
/// decoded value only where the wire carried one.
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
    mesg: MesgNum,
    fields: Vec<Field>,
}

impl Message {
    pub(crate) fn new(mesg: MesgNum) -> Self {
        let fields = profile::fields(mesg)
            .iter()
            .map(|info| Field {
                num: info.num,
                name: info.name,
                value: Value::invalid(info.base_type),
            })
            .collect();
        Self { mesg, fields }
    }

    pub fn mesg_num(&self) -> MesgNum {
        self.mesg
    }

    /// The value of the field with profile number `num`, if the profile
    /// defines it for this message.
    pub fn field(&self, num: u8) -> Option<&Value> {
        self.fields.iter().find(|f| f.num == num).map(|f| &f.value)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub(crate) fn set(&mut self, index: usize, value: Value) {
        self.fields[index].value = value;
    }
}

/// The mandatory first message of every FIT file, in typed form.
///
/// Fields the wire did not populate keep their invalid sentinel values
/// (`time_created` becomes `None`).
#[derive(Clone, PartialEq, Debug)]
pub struct FileIdMsg {
    /// Raw file type value; see [`crate::FileType`] for the known set.
    pub file_type: u8,
    pub manufacturer: u16,
    pub product: u16,
    pub serial_number: u32,
    pub time_created: Option<DateTime<Utc>>,
    pub number: u16,
    pub product_name: String,
}

impl From<&Message> for FileIdMsg {
    fn from(msg: &Message) -> Self {
        let mut id = FileIdMsg {
            file_type: 0xFF,
            manufacturer: 0xFFFF,
            product: 0xFFFF,
            serial_number: 0,
            time_created: None,
            number: 0xFFFF,
            product_name: String::new(),
        };
        for field in msg.fields() {
            match (field.num, &field.value) {
                (0, Value::Enum(v)) => id.file_type = *v,
                (1, Value::UInt16(v)) => id.manufacturer = *v,
                (2, Value::UInt16(v)) => id.product = *v,
                (3, Value::UInt32z(v)) => id.serial_number = *v,
                (4, Value::DateTime(t)) => id.time_created = Some(*t),
                (5, Value::UInt16(v)) => id.number = *v,
                (8, Value::String(s)) => id.product_name = s.clone(),
                _ => (),
            }
        }
        id
    }
}
