// src/domain/vocab.rs

//! Closed vocabularies used by helpdesk records.
//!
//! Every enum keeps the clinic's stored wire value (Portuguese) and decodes
//! anything it does not recognise into `Unknown(raw)`, so a record written by
//! another client never fails to load and re-encodes byte for byte.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $variant, )+
            Unknown(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $wire, )+
                    Self::Unknown(raw) => raw,
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Unknown(_))
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $( $wire => Self::$variant, )+
                    _ => Self::Unknown(raw),
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::from(raw.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                match value {
                    $name::Unknown(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Colour family the front-end uses for badges and bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Orange,
    Blue,
    Green,
    Yellow,
    Red,
    Purple,
    Pink,
    Cyan,
    Neutral,
}

wire_enum! {
    /// Communication medium a conversation arrived on.
    pub enum Channel {
        Whatsapp => "whatsapp",
        Instagram => "instagram",
        Facebook => "facebook",
        Email => "email",
        Chat => "chat",
        Phone => "telefone",
    }
}

impl Channel {
    pub fn label(&self) -> &str {
        match self {
            Self::Whatsapp => "WhatsApp",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::Email => "E-mail",
            Self::Chat => "Chat Web",
            Self::Phone => "Telefone",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Whatsapp | Self::Chat => "💬",
            Self::Instagram => "📷",
            Self::Facebook => "👥",
            Self::Email => "📧",
            Self::Phone => "📞",
            Self::Unknown(_) => "✉️",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::Whatsapp => Tone::Green,
            Self::Instagram => Tone::Pink,
            Self::Facebook => Tone::Blue,
            Self::Email => Tone::Purple,
            Self::Chat => Tone::Cyan,
            Self::Phone => Tone::Orange,
            Self::Unknown(_) => Tone::Neutral,
        }
    }
}

wire_enum! {
    /// Handling state of a conversation. Informational only: any value may
    /// replace any other.
    pub enum ConversationStatus {
        Waiting => "aguardando",
        InProgress => "em_atendimento",
        Resolved => "resolvido",
        Pending => "pendente",
    }
}

impl Default for ConversationStatus {
    fn default() -> Self {
        Self::Waiting
    }
}

impl ConversationStatus {
    /// Human label: the wire value with underscores as spaces.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::Waiting => Tone::Orange,
            Self::InProgress => Tone::Blue,
            Self::Resolved => Tone::Green,
            Self::Pending => Tone::Yellow,
            Self::Unknown(_) => Tone::Neutral,
        }
    }
}

wire_enum! {
    pub enum Priority {
        Low => "baixa",
        Medium => "media",
        High => "alta",
        Urgent => "urgente",
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

wire_enum! {
    pub enum Sender {
        Patient => "paciente",
        Agent => "atendente",
        System => "sistema",
    }
}

wire_enum! {
    pub enum MessageKind {
        Text => "texto",
        Image => "imagem",
        File => "arquivo",
        Audio => "audio",
        Video => "video",
    }
}

impl Default for MessageKind {
    fn default() -> Self {
        Self::Text
    }
}

wire_enum! {
    pub enum Specialty {
        Cardiology => "cardiologia",
        Dermatology => "dermatologia",
        Orthopedics => "ortopedia",
        Pediatrics => "pediatria",
        Gynecology => "ginecologia",
        Ophthalmology => "oftalmologia",
        Neurology => "neurologia",
        GeneralPractice => "clinico_geral",
        Other => "outro",
    }
}

impl Specialty {
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

wire_enum! {
    pub enum AppointmentStatus {
        Scheduled => "agendado",
        Confirmed => "confirmado",
        Cancelled => "cancelado",
        Completed => "realizado",
        NoShow => "faltou",
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

impl AppointmentStatus {
    pub fn tone(&self) -> Tone {
        match self {
            Self::Scheduled => Tone::Blue,
            Self::Confirmed => Tone::Green,
            Self::Cancelled => Tone::Red,
            Self::Completed => Tone::Purple,
            Self::NoShow => Tone::Orange,
            Self::Unknown(_) => Tone::Neutral,
        }
    }
}

wire_enum! {
    pub enum ConsultationType {
        FirstVisit => "primeira_vez",
        Return => "retorno",
        Exam => "exame",
    }
}

wire_enum! {
    /// Health plan on a patient record.
    pub enum InsurancePlan {
        Private => "particular",
        Unimed => "unimed",
        SulAmerica => "sulamerica",
        Bradesco => "bradesco",
        Amil => "amil",
        Other => "outro",
    }
}

impl Default for InsurancePlan {
    fn default() -> Self {
        Self::Private
    }
}

wire_enum! {
    pub enum PatientStatus {
        Active => "ativo",
        Inactive => "inativo",
    }
}

impl Default for PatientStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl PatientStatus {
    pub fn tone(&self) -> Tone {
        match self {
            Self::Active => Tone::Green,
            _ => Tone::Neutral,
        }
    }
}

wire_enum! {
    pub enum QuickReplyCategory {
        Greeting => "saudacao",
        Hours => "horario",
        Scheduling => "agendamento",
        Documents => "documentos",
        Insurance => "convenio",
        Location => "localizacao",
        Farewell => "despedida",
        Other => "outro",
    }
}

impl Default for QuickReplyCategory {
    fn default() -> Self {
        Self::Greeting
    }
}

wire_enum! {
    /// Staff role ("cargo") owned by the auth provider.
    pub enum UserRole {
        Manager => "gerente",
        Agent => "atendente",
    }
}

wire_enum! {
    pub enum Availability {
        Available => "disponivel",
        Busy => "ocupado",
        Away => "ausente",
    }
}

impl Availability {
    pub fn tone(&self) -> Tone {
        match self {
            Self::Available => Tone::Green,
            Self::Busy => Tone::Yellow,
            _ => Tone::Neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values_round_trip_through_json() {
        let status: ConversationStatus = serde_json::from_str("\"em_atendimento\"").unwrap();
        assert_eq!(status, ConversationStatus::InProgress);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"em_atendimento\"");
    }

    #[test]
    fn unknown_values_are_preserved() {
        let channel: Channel = serde_json::from_str("\"telegram\"").unwrap();
        assert_eq!(channel, Channel::Unknown("telegram".into()));
        assert!(!channel.is_known());
        assert_eq!(channel.label(), "telegram");
        assert_eq!(channel.tone(), Tone::Neutral);
        assert_eq!(serde_json::to_string(&channel).unwrap(), "\"telegram\"");
    }

    #[test]
    fn channel_labels_match_the_dashboard() {
        assert_eq!(Channel::Email.label(), "E-mail");
        assert_eq!(Channel::Chat.label(), "Chat Web");
        assert_eq!(Channel::from("telefone"), Channel::Phone);
        assert_eq!(Channel::Phone.icon(), "📞");
    }

    #[test]
    fn status_label_replaces_underscores() {
        assert_eq!(ConversationStatus::InProgress.label(), "em atendimento");
        assert_eq!(ConversationStatus::Unknown("sem_status".into()).label(), "sem status");
        assert_eq!(ConversationStatus::Unknown("x".into()).tone(), Tone::Neutral);
    }

    #[test]
    fn defaults_follow_the_record_schema() {
        assert_eq!(ConversationStatus::default(), ConversationStatus::Waiting);
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(AppointmentStatus::default(), AppointmentStatus::Scheduled);
        assert_eq!(MessageKind::default(), MessageKind::Text);
        assert_eq!(PatientStatus::default(), PatientStatus::Active);
    }
}
