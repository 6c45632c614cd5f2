//
//  mod.rs
//  MovieGraph
//
//  Created by hak (tharun)
//

pub mod search;

pub use search::{
    neighborhood, paths, stats, NeighborhoodRequest, NeighborhoodResponse, PathsRequest,
    PathsResponse, QueryError, QueryLimits, StatsResponse,
};
