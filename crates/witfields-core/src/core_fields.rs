//! Well-known field ids and reference names of the core work-item fields.
//!
//! Negative ids are server-internal fields that never appear in process
//! templates; positive ids are the classic core fields.

pub const TITLE: i32 = 1;
pub const STATE: i32 = 2;
pub const AUTHORIZED_DATE: i32 = 3;
pub const WATERMARK: i32 = 7;
pub const REVISION: i32 = 8;
pub const CHANGED_BY: i32 = 9;
pub const REASON: i32 = 22;
pub const ASSIGNED_TO: i32 = 24;
pub const WORK_ITEM_TYPE: i32 = 25;
pub const CREATED_DATE: i32 = 32;
pub const CREATED_BY: i32 = 33;
pub const DESCRIPTION: i32 = 52;
pub const HISTORY: i32 = 54;
pub const RELATED_LINK_COUNT: i32 = 75;

pub const AUTHORIZED_AS: i32 = -1;
pub const AREA_ID: i32 = -2;
pub const ID: i32 = -3;
pub const CHANGED_DATE: i32 = -4;
pub const REVISED_DATE: i32 = -5;
pub const PERSON_ID: i32 = -6;
pub const AREA_PATH: i32 = -7;
pub const NODE_NAME: i32 = -12;
pub const NODE_TYPE: i32 = -13;
pub const ATTACHED_FILE_COUNT: i32 = -31;
pub const HYPERLINK_COUNT: i32 = -32;
pub const TEAM_PROJECT: i32 = -42;
pub const EXTERNAL_LINK_COUNT: i32 = -57;
pub const ITERATION_ID: i32 = -104;
pub const ITERATION_PATH: i32 = -105;

/// Reference names of the core fields.
pub mod names {
    pub const TITLE: &str = "System.Title";
    pub const STATE: &str = "System.State";
    pub const AUTHORIZED_DATE: &str = "System.AuthorizedDate";
    pub const WATERMARK: &str = "System.Watermark";
    pub const REVISION: &str = "System.Rev";
    pub const CHANGED_BY: &str = "System.ChangedBy";
    pub const REASON: &str = "System.Reason";
    pub const ASSIGNED_TO: &str = "System.AssignedTo";
    pub const WORK_ITEM_TYPE: &str = "System.WorkItemType";
    pub const CREATED_DATE: &str = "System.CreatedDate";
    pub const CREATED_BY: &str = "System.CreatedBy";
    pub const DESCRIPTION: &str = "System.Description";
    pub const HISTORY: &str = "System.History";
    pub const RELATED_LINK_COUNT: &str = "System.RelatedLinkCount";
    pub const AUTHORIZED_AS: &str = "System.AuthorizedAs";
    pub const AREA_ID: &str = "System.AreaId";
    pub const ID: &str = "System.Id";
    pub const CHANGED_DATE: &str = "System.ChangedDate";
    pub const REVISED_DATE: &str = "System.RevisedDate";
    pub const PERSON_ID: &str = "System.PersonId";
    pub const AREA_PATH: &str = "System.AreaPath";
    pub const NODE_NAME: &str = "System.NodeName";
    pub const NODE_TYPE: &str = "System.NodeType";
    pub const ATTACHED_FILE_COUNT: &str = "System.AttachedFileCount";
    pub const HYPERLINK_COUNT: &str = "System.HyperLinkCount";
    pub const TEAM_PROJECT: &str = "System.TeamProject";
    pub const EXTERNAL_LINK_COUNT: &str = "System.ExternalLinkCount";
    pub const ITERATION_ID: &str = "System.IterationId";
    pub const ITERATION_PATH: &str = "System.IterationPath";
}

/// Hierarchy node type ids.
pub mod node_types {
    pub const PROJECT: i32 = -42;
    pub const AREA: i32 = -43;
    pub const ITERATION: i32 = -44;
}
