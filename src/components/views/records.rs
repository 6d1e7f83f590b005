//! Sample call desk records used by the dashboard views.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallRecord {
    pub id: &'static str,
    pub caller: &'static str,
    pub agent: &'static str,
    pub started_at: &'static str,
    pub recording: &'static str,
}

impl CallRecord {
    pub fn anchor_id(&self) -> String {
        format!("call-{}", self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplaintRecord {
    pub id: &'static str,
    pub customer: &'static str,
    pub subject: &'static str,
    pub status: &'static str,
    pub call_id: Option<&'static str>,
    pub voicemail: Option<&'static str>,
}

impl ComplaintRecord {
    pub fn anchor_id(&self) -> String {
        format!("complaint-{}", self.id)
    }

    pub fn call(&self) -> Option<&'static CallRecord> {
        self.call_id.and_then(find_call)
    }
}

pub const CALLS: &[CallRecord] = &[
    CallRecord {
        id: "1042",
        caller: "+44 20 7946 0018",
        agent: "Priya N.",
        started_at: "09:12",
        recording: "https://recordings.example.com/calls/1042.mp3",
    },
    CallRecord {
        id: "1043",
        caller: "+44 161 496 0732",
        agent: "Tom R.",
        started_at: "09:27",
        recording: "https://recordings.example.com/calls/1043.mp3",
    },
    CallRecord {
        id: "1044",
        caller: "+44 113 496 0551",
        agent: "Priya N.",
        started_at: "10:03",
        recording: "/media/calls/1044.mp3",
    },
    CallRecord {
        id: "1045",
        caller: "Withheld",
        agent: "Sam K.",
        started_at: "10:41",
        recording: "https://recordings.example.com/calls/1045.wav",
    },
];

pub const COMPLAINTS: &[ComplaintRecord] = &[
    ComplaintRecord {
        id: "C-318",
        customer: "Harriet Cole",
        subject: "Charged twice for March",
        status: "Open",
        call_id: Some("1042"),
        voicemail: Some("https://recordings.example.com/voicemail/c-318.mp3"),
    },
    ComplaintRecord {
        id: "C-319",
        customer: "Dev Patel",
        subject: "Engineer missed appointment",
        status: "Escalated",
        call_id: Some("1045"),
        voicemail: None,
    },
    ComplaintRecord {
        id: "C-320",
        customer: "Moira Shaw",
        subject: "Line drops every evening",
        status: "Resolved",
        call_id: None,
        voicemail: Some("/media/voicemail/c-320.mp3"),
    },
];

pub fn find_call(id: &str) -> Option<&'static CallRecord> {
    CALLS.iter().find(|call| call.id == id)
}

pub fn find_complaint(id: &str) -> Option<&'static ComplaintRecord> {
    COMPLAINTS.iter().find(|complaint| complaint.id == id)
}
