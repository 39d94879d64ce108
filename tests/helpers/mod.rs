pub mod mock_channel;
